//! Integer spider-chart scores, one per dimension

use crate::aggregate::DimensionAverages;
use crate::dimensions::Dimension;
use serde::{Deserialize, Serialize};

/// Whole-number score (1-5) for each of the ten dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiderChartScores {
    pub sustainability_leadership: u8,
    pub organization: u8,
    pub sustainability_risk_management: u8,
    pub data_systems: u8,
    pub people_competency: u8,
    pub direct_asset_management: u8,
    pub product_management: u8,
    pub vendor_management: u8,
    pub metrics_reporting: u8,
    pub managing_change: u8,
}

impl SpiderChartScores {
    /// Same score on every dimension
    pub fn uniform(score: u8) -> Self {
        let score = score.clamp(1, 5);
        Self {
            sustainability_leadership: score,
            organization: score,
            sustainability_risk_management: score,
            data_systems: score,
            people_competency: score,
            direct_asset_management: score,
            product_management: score,
            vendor_management: score,
            metrics_reporting: score,
            managing_change: score,
        }
    }

    /// Round each average to the nearest whole number (ties to even);
    /// unscored dimensions stay at 1
    pub fn from_averages(averages: &DimensionAverages) -> Self {
        let mut scores = Self::uniform(1);
        for (dimension, average) in averages.iter() {
            scores.set(dimension, average.round_ties_even().clamp(1.0, 5.0) as u8);
        }
        scores
    }

    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::SustainabilityLeadership => self.sustainability_leadership,
            Dimension::Organization => self.organization,
            Dimension::SustainabilityRiskManagement => self.sustainability_risk_management,
            Dimension::DataSystems => self.data_systems,
            Dimension::PeopleCompetency => self.people_competency,
            Dimension::DirectAssetManagement => self.direct_asset_management,
            Dimension::ProductManagement => self.product_management,
            Dimension::VendorManagement => self.vendor_management,
            Dimension::MetricsReporting => self.metrics_reporting,
            Dimension::ManagingChange => self.managing_change,
        }
    }

    /// Set a score, clamped to 1-5
    pub fn set(&mut self, dimension: Dimension, score: u8) {
        let score = score.clamp(1, 5);
        let slot = match dimension {
            Dimension::SustainabilityLeadership => &mut self.sustainability_leadership,
            Dimension::Organization => &mut self.organization,
            Dimension::SustainabilityRiskManagement => &mut self.sustainability_risk_management,
            Dimension::DataSystems => &mut self.data_systems,
            Dimension::PeopleCompetency => &mut self.people_competency,
            Dimension::DirectAssetManagement => &mut self.direct_asset_management,
            Dimension::ProductManagement => &mut self.product_management,
            Dimension::VendorManagement => &mut self.vendor_management,
            Dimension::MetricsReporting => &mut self.metrics_reporting,
            Dimension::ManagingChange => &mut self.managing_change,
        };
        *slot = score;
    }

    /// (dimension, score) pairs in chart order
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, u8)> + '_ {
        Dimension::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

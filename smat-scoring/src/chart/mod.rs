//! Radar chart model and rendering
//!
//! [`RadarChart`] describes what to draw; a [`ChartRenderer`] turns it into a
//! PNG. The raster renderer is the production implementation.

pub mod glyphs;
mod raster;

pub use raster::RasterChartRenderer;

use crate::aggregate::DimensionAverages;
use crate::dimensions::Dimension;
use crate::spider::SpiderChartScores;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::collections::HashMap;
use thiserror::Error;

/// Radial axis maximum
pub const AXIS_MAX: f64 = 5.0;

/// Gridline labels for levels 1 through 5
pub const GRID_LABELS: [&str; 5] = ["Resist", "Comply", "Optimize", "Reinvent", "Lead"];

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart has no axes")]
    NoAxes,

    #[error("series '{name}' has {got} values for {expected} axes")]
    SeriesLength {
        name: String,
        got: usize,
        expected: usize,
    },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Drawing style of one series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub color: [u8; 3],
    pub line_width: f32,
    pub dashed: bool,
    /// Fill opacity, 0 for no fill
    pub fill_alpha: f32,
    pub marker_radius: f32,
}

impl SeriesStyle {
    /// Solid green, the company's own scores
    pub const COMPANY: SeriesStyle = SeriesStyle {
        color: [0x4C, 0xAF, 0x50],
        line_width: 6.0,
        dashed: false,
        fill_alpha: 0.3,
        marker_radius: 8.0,
    };

    /// Dashed red outline, the industry benchmark
    pub const INDUSTRY: SeriesStyle = SeriesStyle {
        color: [0xFF, 0x6B, 0x6B],
        line_width: 4.0,
        dashed: true,
        fill_alpha: 0.1,
        marker_radius: 6.0,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarSeries {
    pub name: String,
    /// One value per axis, clamped to 0-5 when drawn
    pub values: Vec<f64>,
    pub style: SeriesStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarChart {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Axis labels, drawn clockwise from 12 o'clock
    pub axes: Vec<String>,
    pub series: Vec<RadarSeries>,
}

impl RadarChart {
    /// Company scores against the industry benchmark
    ///
    /// Only scored dimensions get an axis. A scored dimension with no
    /// industry average is plotted at 0 on the industry series.
    pub fn comparison(
        averages: &DimensionAverages,
        industry: &HashMap<Dimension, f64>,
        company_name: &str,
    ) -> Self {
        let dimensions: Vec<Dimension> = Dimension::ALL
            .into_iter()
            .filter(|d| averages.contains(*d))
            .collect();

        let company_values = dimensions
            .iter()
            .map(|d| averages.get(*d).unwrap_or(0.0))
            .collect();
        let industry_values = dimensions
            .iter()
            .map(|d| industry.get(d).copied().unwrap_or(0.0))
            .collect();

        Self {
            title: format!(
                "Sustainability Maturity Assessment - {} vs Industry",
                company_name
            ),
            width: 1400,
            height: 1200,
            axes: dimensions.iter().map(|d| d.name().to_string()).collect(),
            series: vec![
                RadarSeries {
                    name: format!("{} (Your Scores)", company_name),
                    values: company_values,
                    style: SeriesStyle::COMPANY,
                },
                RadarSeries {
                    name: "Industry Average".to_string(),
                    values: industry_values,
                    style: SeriesStyle::INDUSTRY,
                },
            ],
        }
    }

    /// All ten dimensions from whole-number scores, no benchmark
    pub fn single(scores: &SpiderChartScores, company_name: &str) -> Self {
        Self {
            title: format!("Sustainability Maturity Assessment - {}", company_name),
            width: 1200,
            height: 1200,
            axes: Dimension::ALL
                .iter()
                .map(|d| d.chart_label().to_string())
                .collect(),
            series: vec![RadarSeries {
                name: company_name.to_string(),
                values: scores.iter().map(|(_, s)| f64::from(s)).collect(),
                style: SeriesStyle::COMPANY,
            }],
        }
    }

    /// Check the chart can be drawn
    pub fn validate(&self) -> Result<(), ChartError> {
        if self.axes.is_empty() {
            return Err(ChartError::NoAxes);
        }
        for series in &self.series {
            if series.values.len() != self.axes.len() {
                return Err(ChartError::SeriesLength {
                    name: series.name.clone(),
                    got: series.values.len(),
                    expected: self.axes.len(),
                });
            }
        }
        Ok(())
    }
}

/// Encoded chart image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub png: Vec<u8>,
}

impl ChartImage {
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.png)
    }
}

pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &RadarChart) -> Result<ChartImage, ChartError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_axes_follow_dimension_order() {
        // Averages in question order, axes in chart order
        let averages: DimensionAverages = vec![
            (Dimension::ManagingChange, 3.0),
            (Dimension::Organization, 2.5),
        ]
        .into_iter()
        .collect();
        let chart = RadarChart::comparison(&averages, &HashMap::new(), "Apex");
        assert_eq!(chart.axes, vec!["Organization", "Managing Change"]);
        assert_eq!(chart.series[0].values, vec![2.5, 3.0]);
        assert_eq!(
            chart.title,
            "Sustainability Maturity Assessment - Apex vs Industry"
        );
        assert_eq!((chart.width, chart.height), (1400, 1200));
    }

    #[test]
    fn test_missing_industry_average_plots_zero() {
        let averages: DimensionAverages = vec![
            (Dimension::Organization, 2.5),
            (Dimension::DataSystems, 4.0),
        ]
        .into_iter()
        .collect();
        let industry = HashMap::from([(Dimension::Organization, 2.8)]);
        let chart = RadarChart::comparison(&averages, &industry, "Apex");
        assert_eq!(chart.series[1].name, "Industry Average");
        assert_eq!(chart.series[1].values, vec![2.8, 0.0]);
        assert!(chart.series[1].style.dashed);
    }

    #[test]
    fn test_single_uses_all_chart_labels() {
        let chart = RadarChart::single(&SpiderChartScores::uniform(3), "Apex");
        assert_eq!(chart.axes.len(), 10);
        assert_eq!(chart.axes[1], "Organization Structure");
        assert_eq!(chart.series.len(), 1);
        assert!(chart.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_and_mismatched() {
        let empty = RadarChart::comparison(&DimensionAverages::default(), &HashMap::new(), "Apex");
        assert!(matches!(empty.validate(), Err(ChartError::NoAxes)));

        let mut chart = RadarChart::single(&SpiderChartScores::uniform(3), "Apex");
        chart.series[0].values.pop();
        assert!(matches!(
            chart.validate(),
            Err(ChartError::SeriesLength { got: 9, expected: 10, .. })
        ));
    }

    #[test]
    fn test_image_base64() {
        let image = ChartImage { png: vec![0x89, b'P', b'N', b'G'] };
        assert_eq!(image.to_base64(), "iVBORw==");
    }
}

//! Visualization utilities for ekf_slam
//!
//! Renders a simulated run (trajectories and landmarks) with gnuplot.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Point2D, Pose2D, SlamError, SlamResult};
use crate::simulation::history::point_xy;
use crate::simulation::SlamHistory;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const BLUE: &str = "#0000FF";
    pub const YELLOW: &str = "#FFFF00";
    pub const CYAN: &str = "#00FFFF";

    // Semantic colors
    pub const ESTIMATED: &str = "#35C788";
    pub const GROUND_TRUTH: &str = BLUE;
    pub const DEAD_RECKONING: &str = YELLOW;
    pub const TRUE_LANDMARK: &str = BLACK;
    pub const ESTIMATED_LANDMARK: &str = CYAN;
}

/// Style for trajectory rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

/// One series queued for drawing
#[derive(Debug, Clone)]
enum Layer {
    Track {
        x: Vec<f64>,
        y: Vec<f64>,
        style: PathStyle,
    },
    Points {
        x: Vec<f64>,
        y: Vec<f64>,
        style: PointStyle,
    },
}

/// Plot of one EKF SLAM run
///
/// Series are queued and drawn onto a single set of axes when saved, so all
/// of them share one scale.
pub struct SlamPlot {
    figure: Figure,
    title: String,
    layers: Vec<Layer>,
}

impl SlamPlot {
    pub fn new(title: &str) -> Self {
        Self {
            figure: Figure::new(),
            title: title.to_string(),
            layers: Vec::new(),
        }
    }

    /// Plot a pose track
    pub fn plot_track(&mut self, track: &[Pose2D], style: &PathStyle) -> &mut Self {
        let (x, y) = SlamHistory::xy(track);
        self.layers.push(Layer::Track {
            x,
            y,
            style: style.clone(),
        });
        self
    }

    /// Plot landmark positions
    pub fn plot_landmarks(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        let (x, y) = point_xy(points);
        self.layers.push(Layer::Points {
            x,
            y,
            style: style.clone(),
        });
        self
    }

    /// Truth, dead reckoning and estimate tracks plus true and estimated landmarks
    pub fn plot_run(
        &mut self,
        history: &SlamHistory,
        true_landmarks: &[Point2D],
        estimated_landmarks: &[Point2D],
    ) -> &mut Self {
        self.plot_landmarks(
            true_landmarks,
            &PointStyle::new(colors::TRUE_LANDMARK, "True Landmarks")
                .with_symbol('*')
                .with_size(2.0),
        )
        .plot_landmarks(
            estimated_landmarks,
            &PointStyle::new(colors::ESTIMATED_LANDMARK, "Est. Landmarks").with_size(1.5),
        )
        .plot_track(
            &history.truth,
            &PathStyle::new(colors::GROUND_TRUTH, "True"),
        )
        .plot_track(
            &history.dead_reckoning,
            &PathStyle::new(colors::DEAD_RECKONING, "Dead Reckoning").with_line_width(1.0),
        )
        .plot_track(
            &history.estimate,
            &PathStyle::new(colors::ESTIMATED, "EKF SLAM"),
        )
    }

    /// Save plot to SVG file
    pub fn save_svg(&mut self, path: &str, width: u32, height: u32) -> SlamResult<()> {
        self.render();
        self.figure
            .save_to_svg(path, width, height)
            .map_err(|e| SlamError::Visualization(format!("{:?}", e)))
    }

    fn render(&mut self) {
        self.figure.clear_axes();
        let axes = self.figure.axes2d();
        axes.set_title(&self.title, &[]);
        axes.set_x_label("x [m]", &[]);
        axes.set_y_label("y [m]", &[]);
        axes.set_aspect_ratio(AutoOption::Fix(1.0));

        for layer in self.layers.iter() {
            match layer {
                Layer::Track { x, y, style } => {
                    axes.lines(
                        x,
                        y,
                        &[
                            Caption(&style.caption),
                            Color(&style.color),
                            LineWidth(style.line_width),
                        ],
                    );
                }
                Layer::Points { x, y, style } => {
                    axes.points(
                        x,
                        y,
                        &[
                            Caption(&style.caption),
                            Color(&style.color),
                            PointSymbol(style.symbol),
                            PointSize(style.size),
                        ],
                    );
                }
            }
        }
    }
}

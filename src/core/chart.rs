//! SVG line charts for the softmax curve family.

use std::fmt::Write as _;
use std::path::Path;

use crate::curves::SoftmaxCurves;
use crate::error::Result;

const SERIES_COLORS: [&str; 8] = [
    "#7aa2ff", // blue
    "#fbbf24", // amber
    "#4ade80", // green
    "#fb7185", // pink/red
    "#a78bfa", // purple
    "#22c55e", // bright green
    "#60a5fa", // light blue
    "#e879f9", // magenta
];

const MARGIN: f64 = 40.0;

#[derive(Debug, Clone)]
pub struct LineChart {
    pub width: f64,
    pub height: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub title: String,
    pub bg_color: String,
    pub grid_color: String,
}

impl Default for LineChart {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 400.0,
            y_min: 0.0,
            y_max: 1.0,
            title: "softmax".to_string(),
            bg_color: "#0b1020".to_string(),
            grid_color: "rgba(122, 162, 255, 0.25)".to_string(),
        }
    }
}

impl LineChart {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Render one polyline per series against the shared `xs`.
    ///
    /// Series values are clamped into `[y_min, y_max]`; non-finite points are
    /// skipped.
    pub fn render_svg(&self, xs: &[f64], series: &[&[f64]], labels: &[String]) -> String {
        let w = self.width;
        let h = self.height;
        let plot_w = (w - 2.0 * MARGIN).max(1.0);
        let plot_h = (h - 2.0 * MARGIN).max(1.0);

        let (x_min, x_max) = match (xs.first(), xs.last()) {
            (Some(&a), Some(&b)) if b > a => (a, b),
            (Some(&a), _) => (a, a + 1.0),
            _ => (0.0, 1.0),
        };
        let y_range = (self.y_max - self.y_min).max(1e-9);

        let to_px = |x: f64, y: f64| -> (f64, f64) {
            let px = MARGIN + (x - x_min) / (x_max - x_min) * plot_w;
            let norm = ((y - self.y_min) / y_range).clamp(0.0, 1.0);
            (px, MARGIN + plot_h - norm * plot_h)
        };

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = writeln!(
            svg,
            r#"<rect x="0" y="0" width="{w}" height="{h}" fill="{}"/>"#,
            self.bg_color
        );

        // Grid
        for i in 0..=5 {
            let y = MARGIN + plot_h * (i as f64) / 5.0;
            let value = self.y_max - y_range * (i as f64) / 5.0;
            let _ = writeln!(
                svg,
                r#"<line x1="{MARGIN}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="{}" stroke-width="0.5"/>"#,
                MARGIN + plot_w,
                self.grid_color
            );
            let _ = writeln!(
                svg,
                r##"<text x="{:.2}" y="{:.2}" font-size="10" fill="#aab4e6" text-anchor="end">{value:.1}</text>"##,
                MARGIN - 4.0,
                y + 3.0
            );
        }
        let _ = writeln!(
            svg,
            r##"<text x="{:.2}" y="{:.2}" font-size="10" fill="#aab4e6">{x_min:.1}</text>"##,
            MARGIN,
            h - MARGIN + 14.0
        );
        let _ = writeln!(
            svg,
            r##"<text x="{:.2}" y="{:.2}" font-size="10" fill="#aab4e6" text-anchor="end">{x_max:.1}</text>"##,
            MARGIN + plot_w,
            h - MARGIN + 14.0
        );

        for (si, values) in series.iter().enumerate() {
            let color = SERIES_COLORS[si % SERIES_COLORS.len()];
            let mut points = String::new();
            for (&x, &y) in xs.iter().zip(values.iter()) {
                if !x.is_finite() || !y.is_finite() {
                    continue;
                }
                let (px, py) = to_px(x, y);
                if !points.is_empty() {
                    points.push(' ');
                }
                let _ = write!(points, "{px:.2},{py:.2}");
            }
            let _ = writeln!(
                svg,
                r#"<polyline fill="none" stroke="{color}" stroke-width="2" points="{points}"/>"#
            );
        }

        // Legend
        let mut lx = MARGIN + 10.0;
        let ly = MARGIN - 14.0;
        for (si, name) in labels.iter().enumerate() {
            let color = SERIES_COLORS[si % SERIES_COLORS.len()];
            let _ = writeln!(
                svg,
                r#"<rect x="{lx:.2}" y="{:.2}" width="10" height="3" fill="{color}"/>"#,
                ly - 4.0
            );
            let _ = writeln!(
                svg,
                r##"<text x="{:.2}" y="{ly:.2}" font-size="11" fill="#e8ecff">{}</text>"##,
                lx + 14.0,
                escape(name)
            );
            lx += 28.0 + name.len() as f64 * 7.0;
        }

        let _ = writeln!(
            svg,
            r##"<text x="{:.2}" y="16" font-size="13" fill="#e8ecff" text-anchor="middle">{}</text>"##,
            w / 2.0,
            escape(&self.title)
        );
        svg.push_str("</svg>\n");
        svg
    }

    pub fn render_curves(&self, curves: &SoftmaxCurves) -> String {
        let series: Vec<&[f64]> = (0..curves.class_count())
            .map(|c| curves.series(c))
            .collect();
        let labels: Vec<String> = curves
            .labels
            .iter()
            .map(|l| format!("score {l}"))
            .collect();
        self.render_svg(&curves.xs, &series, &labels)
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn write_svg(path: &Path, svg: &str) -> Result<()> {
    std::fs::write(path, svg)?;
    tracing::info!(path = %path.display(), bytes = svg.len(), "chart written");
    Ok(())
}

/// Hand the file to the platform's default viewer.
pub fn open_in_viewer(path: &Path) -> Result<()> {
    open::that(path)?;
    Ok(())
}

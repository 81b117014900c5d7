//! Writing the plots of a finished run to an output directory.

use crate::chart::{GridPlot, HistogramPlot, Plot, ScatterPlot};
use crate::Result;
use log::{debug, info};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use xtalk_core::{AccumulatorSet, CrosstalkMap, SubComponent};

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    /// Whether the backend can draw text.
    ///
    /// The bitmap backend is built without a font renderer.
    #[must_use]
    pub fn draws_text(self) -> bool {
        matches!(self, ImageFormat::Svg)
    }
}

/// Renders plots into one directory in one format.
#[derive(Debug, Clone)]
pub struct Renderer {
    out_dir: PathBuf,
    format: ImageFormat,
    size: (u32, u32),
}

impl Renderer {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(out_dir: P, format: ImageFormat) -> Self {
        Self {
            out_dir: out_dir.into(),
            format,
            size: (800, 600),
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Path of the image named `stem`.
    #[must_use]
    pub fn path(&self, stem: &str) -> PathBuf {
        self.out_dir
            .join(format!("{stem}.{}", self.format.extension()))
    }

    /// Draws one plot to `<out_dir>/<stem>.<ext>`.
    ///
    /// # Errors
    /// Returns an error if drawing or writing the image fails.
    pub fn render<P: Plot>(&self, stem: &str, plot: &P) -> Result<PathBuf> {
        let path = self.path(stem);
        let text = self.format.draws_text();
        match self.format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(&path, self.size).into_drawing_area();
                root.fill(&WHITE)?;
                plot.draw(&root, text)?;
                root.present()?;
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(&path, self.size).into_drawing_area();
                root.fill(&WHITE)?;
                plot.draw(&root, text)?;
                root.present()?;
            }
        }
        debug!("wrote {}", path.display());
        Ok(path)
    }

    /// Renders every distribution of a run plus its crosstalk maps.
    ///
    /// Per neighbor channel `i`: `light_yield_{i}`, one
    /// `light_yield_{component}_{i}` per sub-component, `crosstalk_{i}`,
    /// `scatter_{i}`, `time_{i}`, `time_diff_{i}` and `crosstalk_map_{i}`.
    /// Run-wide: `hit_map`, `gun_x`, `gun_y`, `center_light_yield` and
    /// `center_time`.
    ///
    /// # Errors
    /// Returns an error if the output directory cannot be created or any plot
    /// fails to render.
    pub fn render_all(&self, acc: &AccumulatorSet, maps: &[CrosstalkMap]) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.out_dir)?;
        let mut written = Vec::new();

        for ch in acc.channels() {
            let i = ch.channel.index();
            let name = ch.channel.title();
            written.push(self.render(
                &format!("light_yield_{i}"),
                &HistogramPlot {
                    title: format!("{name}: light yield"),
                    x_desc: "Light yield [p.e.]",
                    hist: &ch.light_yield,
                },
            )?);
            for component in SubComponent::ALL {
                written.push(self.render(
                    &format!("light_yield_{}_{i}", component.name()),
                    &HistogramPlot {
                        title: format!("{name}: {} light yield", component.title()),
                        x_desc: "Light yield [p.e.]",
                        hist: ch.sub_component(component),
                    },
                )?);
            }
            written.push(self.render(
                &format!("crosstalk_{i}"),
                &HistogramPlot {
                    title: format!("{name}: crosstalk"),
                    x_desc: "Neighbor / center light yield",
                    hist: &ch.ratio,
                },
            )?);
            written.push(self.render(
                &format!("scatter_{i}"),
                &ScatterPlot {
                    title: format!("{name}: light yield vs center"),
                    x_desc: "Center light yield [p.e.]",
                    y_desc: "Neighbor light yield [p.e.]",
                    hist: &ch.scatter,
                },
            )?);
            written.push(self.render(
                &format!("time_{i}"),
                &HistogramPlot {
                    title: format!("{name}: hit time"),
                    x_desc: "Time [ns]",
                    hist: &ch.time,
                },
            )?);
            written.push(self.render(
                &format!("time_diff_{i}"),
                &HistogramPlot {
                    title: format!("{name}: hit time - center hit time"),
                    x_desc: "Time difference [ns]",
                    hist: &ch.time_diff,
                },
            )?);
        }

        for map in maps {
            written.push(self.render(
                &format!("crosstalk_map_{}", map.channel().index()),
                &GridPlot::from_map(format!("{}: crosstalk [%]", map.channel().title()), map),
            )?);
        }

        written.push(self.render(
            "hit_map",
            &GridPlot::from_counts("Hit map".to_string(), acc.hit_map()),
        )?);
        for (stem, title, x_desc, hist) in [
            ("gun_x", "Beam gun X", "X [mm]", acc.gun_x()),
            ("gun_y", "Beam gun Y", "Y [mm]", acc.gun_y()),
            (
                "center_light_yield",
                "Center cube light yield",
                "Light yield [p.e.]",
                acc.center_light_yield(),
            ),
            ("center_time", "Center cube hit time", "Time [ns]", acc.center_time()),
        ] {
            written.push(self.render(
                stem,
                &HistogramPlot {
                    title: title.to_string(),
                    x_desc,
                    hist,
                },
            )?);
        }

        info!(
            "rendered {} plot(s) to {}",
            written.len(),
            self.out_dir.display()
        );
        Ok(written)
    }
}

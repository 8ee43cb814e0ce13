//! gnuplot-backed `Visualizer`.
//!
//! Interactive mode opens one window per plot and blocks until it is closed.
//! With a save directory every plot goes to a numbered PNG instead.

use std::fs;
use std::path::{Path, PathBuf};

use clatter_core::{
    error::{ClatterError, Result},
    Spectrogram, Spectrum, Visualizer,
};
use gnuplot::{AxesCommon, Caption, Color, Figure};
use tracing::{debug, info, warn};

const PNG_WIDTH: u32 = 1280;
const PNG_HEIGHT: u32 = 720;

pub struct GnuplotViewer {
    save_dir: Option<PathBuf>,
    plots: usize,
}

impl GnuplotViewer {
    pub fn interactive() -> Self {
        Self {
            save_dir: None,
            plots: 0,
        }
    }

    pub fn saving_to(dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: Some(dir.into()),
            plots: 0,
        }
    }

    fn present(&mut self, fig: &mut Figure, kind: &str, title: &str) -> Result<()> {
        self.plots += 1;
        match &self.save_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let path = dir.join(plot_file_name(self.plots, kind, title));
                fig.save_to_png(&path, PNG_WIDTH, PNG_HEIGHT)
                    .map_err(|e| ClatterError::Visualization(e.to_string()))?;
                fig.close();
                info!(path = %path.display(), "plot written");
            }
            None => {
                // gnuplot keeps running until the window is closed; `close`
                // waits for it to exit.
                fig.set_post_commands("pause mouse close");
                fig.show()
                    .map_err(|e| ClatterError::Visualization(e.to_string()))?;
                fig.close();
                debug!(kind, "plot window closed");
            }
        }
        Ok(())
    }
}

impl Visualizer for GnuplotViewer {
    fn show_spectrogram(&mut self, spectrogram: &Spectrogram, title: &str) -> Result<()> {
        let n_frames = spectrogram.n_frames();
        let n_bins = spectrogram.n_bins();
        if n_frames == 0 || n_bins == 0 {
            return Err(ClatterError::Visualization("empty spectrogram".into()));
        }

        // Row-major, one row per frequency bin.
        let cells = (0..n_bins).flat_map(|bin| spectrogram.power_db.iter().map(move |f| f[bin]));
        let x0 = spectrogram.times[0] as f64;
        let x1 = spectrogram.times[n_frames - 1] as f64;
        let y1 = spectrogram.frequencies[n_bins - 1] as f64;

        let mut fig = Figure::new();
        fig.axes2d()
            .set_title(title, &[])
            .set_x_label("Time (s)", &[])
            .set_y_label("Frequency (Hz)", &[])
            .image(cells, n_bins, n_frames, Some((x0, 0.0, x1, y1)), &[]);
        self.present(&mut fig, "spectrogram", title)
    }

    fn show_spectrum(&mut self, spectrum: &Spectrum, title: &str) -> Result<()> {
        if spectrum.is_empty() {
            warn!(title, "nothing to plot for an empty spectrum");
            return Ok(());
        }

        let mut fig = Figure::new();
        fig.axes2d()
            .set_title(&format!("FFT {title}"), &[])
            .set_x_label("Frequency (Hz)", &[])
            .set_y_label("|X|", &[])
            .lines(
                spectrum.frequencies.iter().copied(),
                spectrum.magnitudes.iter().copied(),
                &[Caption("magnitude"), Color("black")],
            );
        self.present(&mut fig, "spectrum", title)
    }
}

/// `003-spectrogram-12m30s-13m5s-door.png` style names.
pub fn plot_file_name(index: usize, kind: &str, title: &str) -> String {
    let mut slug = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        format!("{index:03}-{kind}.png")
    } else {
        format!("{index:03}-{kind}-{slug}.png")
    }
}

/// Viewer for the `--save` flag, if any.
pub fn viewer_for(save: Option<&Path>) -> GnuplotViewer {
    match save {
        Some(dir) => GnuplotViewer::saving_to(dir),
        None => GnuplotViewer::interactive(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_numbered_and_slugged() {
        assert_eq!(
            plot_file_name(3, "spectrogram", "Spectrogram 12m30s-13m5s door slam"),
            "003-spectrogram-spectrogram-12m30s-13m5s-door-slam.png"
        );
        assert_eq!(plot_file_name(12, "spectrum", "  "), "012-spectrum.png");
    }

    #[test]
    fn empty_spectrum_is_skipped_without_plotting() {
        let mut viewer = GnuplotViewer::saving_to(std::env::temp_dir().join("clatter-plot-empty"));
        viewer.show_spectrum(&Spectrum::default(), "nothing").unwrap();
        assert_eq!(viewer.plots, 0);
    }

    #[test]
    fn save_flag_selects_png_mode() {
        let viewer = viewer_for(Some(Path::new("plots")));
        assert_eq!(viewer.save_dir.as_deref(), Some(Path::new("plots")));
        assert!(viewer_for(None).save_dir.is_none());
    }
}

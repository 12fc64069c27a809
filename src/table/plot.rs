//! Plots comparing abundance tables across groups of samples.

use anyhow::bail;
use anyhow::ensure;
use anyhow::Context;
use plotly::common::ErrorData;
use plotly::common::ErrorType;
use plotly::common::Line;
use plotly::common::Mode;
use plotly::common::Title;
use plotly::layout::Axis;
use plotly::layout::AxisType;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;

use crate::table::abundance::AbundanceTable;
use crate::table::abundance::Grouping;
use crate::table::stats::compute_prevalence;
use crate::table::stats::fraction_above;
use crate::table::stats::sort_trim;

/// The Dark2 qualitative palette, cycled through by category.
const PALETTE: [&str; 8] = [
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d", "#666666",
];

fn color(i: usize) -> String {
    PALETTE[i % PALETTE.len()].to_string()
}

fn axis(title: &str, log: bool) -> Axis {
    let axis = Axis::new().title(Title::new(title));
    match log {
        true => axis.type_(AxisType::Log),
        false => axis,
    }
}

/// Creates a line for one category. Only the first line of each category is
/// shown in the legend.
fn line(x: Vec<f64>, y: Vec<f64>, category: &str, i: usize, first: bool) -> Box<Scatter<f64, f64>> {
    Scatter::new(x, y)
        .mode(Mode::Lines)
        .name(category)
        .legend_group(category)
        .show_legend(first)
        .line(Line::new().color(color(i)).width(2.0))
}

/// A plot of an abundance table split by a grouping of its samples.
pub trait TablePlot {
    /// The name of this plot.
    fn name(&self) -> &'static str;

    /// The filename to output for this plot.
    fn filename(&self) -> &'static str;

    /// Generates the plot.
    fn generate(&self, table: &AbundanceTable, grouping: &Grouping) -> anyhow::Result<Plot>;
}

//================//
// Rank abundance //
//================//

/// A rank abundance (Whittaker) curve per sample, or per category when
/// averaged. The most abundant feature has rank 1 and features with a zero
/// abundance are left out.
pub struct RankAbundancePlot {
    /// Whether the abundance axis is logarithmic.
    pub log: bool,

    /// Plot the mean of each category instead of each sample.
    pub average: bool,

    /// Opacity of the per-sample lines.
    pub alpha: f64,
}

impl TablePlot for RankAbundancePlot {
    fn name(&self) -> &'static str {
        "Rank Abundance"
    }

    fn filename(&self) -> &'static str {
        "rank-abundance"
    }

    fn generate(&self, table: &AbundanceTable, grouping: &Grouping) -> anyhow::Result<Plot> {
        let mut plot = Plot::new();

        for (i, (category, rows)) in grouping.iter().enumerate() {
            let curves = match self.average {
                true => vec![sort_trim(table.mean_rows(rows))],
                false => rows.iter().map(|&r| sort_trim(table.data[r].clone())).collect(),
            };

            for (k, y) in curves.into_iter().enumerate() {
                let x = (1..=y.len()).map(|r| r as f64).collect();
                let mut trace = line(x, y, category, i, k == 0);
                if !self.average {
                    trace = trace.opacity(self.alpha);
                }
                plot.add_trace(trace);
            }
        }

        let y_title = match self.log {
            true => "log(abundance)",
            false => "abundance",
        };
        plot.set_layout(
            Layout::new()
                .title(Title::new(self.name()))
                .x_axis(axis("abundance rank", false))
                .y_axis(axis(y_title, self.log)),
        );

        Ok(plot)
    }
}

//======================//
// Abundance prevalence //
//======================//

/// One prevalence curve per feature and category: the fraction of the
/// category's samples carrying the feature above each abundance.
pub struct AbundancePrevalencePlot {
    /// Whether the abundance axis is logarithmic.
    pub log: bool,

    /// Only features present in more than this fraction of a category's
    /// samples are drawn.
    pub min_prev: f64,

    /// Opacity of the lines.
    pub alpha: f64,
}

impl TablePlot for AbundancePrevalencePlot {
    fn name(&self) -> &'static str {
        "Abundance Prevalence"
    }

    fn filename(&self) -> &'static str {
        "abundance-prevalence"
    }

    fn generate(&self, table: &AbundanceTable, grouping: &Grouping) -> anyhow::Result<Plot> {
        let mut plot = Plot::new();

        for (i, (category, rows)) in grouping.iter().enumerate() {
            let size = rows.len() as f64 * self.min_prev;
            let mut first = true;

            for feature in 0..table.feature_ids.len() {
                let values = table.column(feature, rows);
                let present = values.iter().filter(|&&v| v != 0.0).count() as f64;
                if present <= size {
                    continue;
                }

                let (x, y) = compute_prevalence(&values);
                plot.add_trace(line(x, y, category, i, first).opacity(self.alpha));
                first = false;
            }
        }

        plot.set_layout(prevalence_layout(self.name(), self.log));
        Ok(plot)
    }
}

fn prevalence_layout(name: &str, log: bool) -> Layout {
    let x_title = match log {
        true => "log(abundance)",
        false => "abundance",
    };
    Layout::new()
        .title(Title::new(name))
        .x_axis(axis(x_title, log))
        .y_axis(axis("prevalence", false))
}

//==============================//
// Average abundance prevalence //
//==============================//

/// One prevalence curve per category over all of its abundances, evaluated
/// at cutoffs from zero up to the largest abundance in `step` increments.
pub struct AbundancePrevalenceAveragePlot {
    /// Whether the abundance axis is logarithmic.
    pub log: bool,

    /// Distance between consecutive cutoffs.
    pub step: f64,

    /// Opacity of the lines.
    pub alpha: f64,
}

/// The most cutoffs a single prevalence curve is evaluated at.
const MAX_CUTOFFS: usize = 1_000_000;

impl AbundancePrevalenceAveragePlot {
    /// The cutoffs and prevalences drawn for one category. The step must be
    /// positive and every value finite.
    pub fn curve(&self, values: &[f64]) -> anyhow::Result<(Vec<f64>, Vec<f64>)> {
        ensure!(
            self.step.is_finite() && self.step > 0.0,
            "cutoff step must be a positive number, found {}",
            self.step
        );

        let upper = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            bail!("abundances must be finite, found {}", v);
        }
        ensure!(
            upper / self.step <= MAX_CUTOFFS as f64,
            "a step of {} gives more than {} cutoffs up to {}",
            self.step,
            MAX_CUTOFFS,
            upper
        );

        let mut x = Vec::new();
        let mut k = 0;
        loop {
            let cutoff = k as f64 * self.step;
            if cutoff >= upper {
                break;
            }
            x.push(cutoff);
            k += 1;
        }

        let y = x.iter().map(|&c| fraction_above(values, c)).collect();
        Ok((x, y))
    }
}

impl TablePlot for AbundancePrevalenceAveragePlot {
    fn name(&self) -> &'static str {
        "Average Abundance Prevalence"
    }

    fn filename(&self) -> &'static str {
        "abundance-prevalence-average"
    }

    fn generate(&self, table: &AbundanceTable, grouping: &Grouping) -> anyhow::Result<Plot> {
        let mut plot = Plot::new();

        for (i, (category, rows)) in grouping.iter().enumerate() {
            let values: Vec<f64> = rows
                .iter()
                .flat_map(|&r| table.data[r].iter().copied())
                .collect();
            let (x, y) = self
                .curve(&values)
                .with_context(|| format!("computing the prevalence of group: {}", category))?;
            plot.add_trace(line(x, y, category, i, true).opacity(self.alpha));
        }

        plot.set_layout(prevalence_layout(self.name(), self.log));
        Ok(plot)
    }
}

//============//
// Shorthands //
//============//

/// Rank abundance curves with the default opacity.
pub fn plot_rank_abundance(
    table: &AbundanceTable,
    grouping: &Grouping,
    log: bool,
    average: bool,
) -> anyhow::Result<Plot> {
    RankAbundancePlot {
        log,
        average,
        alpha: 0.6,
    }
    .generate(table, grouping)
}

/// Per-feature prevalence curves with the default opacity.
pub fn plot_abundance_prevalence(
    table: &AbundanceTable,
    grouping: &Grouping,
    log: bool,
    min_prev: f64,
) -> anyhow::Result<Plot> {
    AbundancePrevalencePlot {
        log,
        min_prev,
        alpha: 0.5,
    }
    .generate(table, grouping)
}

/// Per-category prevalence curves with the default opacity.
pub fn plot_abundance_prevalence_ave(
    table: &AbundanceTable,
    grouping: &Grouping,
    log: bool,
    step: f64,
) -> anyhow::Result<Plot> {
    AbundancePrevalenceAveragePlot {
        log,
        step,
        alpha: 0.5,
    }
    .generate(table, grouping)
}

//============//
// Error bars //
//============//

/// A line with symmetric error bars on the y values.
pub fn plot_with_errorbar(x: Vec<f64>, y: Vec<f64>, yerr: Vec<f64>) -> Plot {
    let mut plot = Plot::new();
    let trace = Scatter::new(x, y)
        .mode(Mode::LinesMarkers)
        .error_y(ErrorData::new(ErrorType::Data).array(yerr));
    plot.add_trace(trace);
    plot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AbundanceTable {
        AbundanceTable {
            sample_ids: vec!["a".into(), "b".into(), "c".into()],
            feature_ids: vec!["f1".into(), "f2".into(), "f3".into()],
            data: vec![
                vec![5.0, 0.0, 1.0],
                vec![3.0, 0.0, 0.0],
                vec![0.0, 2.0, 2.0],
            ],
        }
    }

    fn grouping() -> Grouping {
        let samples: Vec<String> = table().sample_ids;
        let pairs = vec![
            ("a".to_string(), "x".to_string()),
            ("b".to_string(), "x".to_string()),
            ("c".to_string(), "y".to_string()),
        ];
        Grouping::from_pairs(&pairs, &samples).unwrap()
    }

    fn traces(plot: &Plot) -> usize {
        plot.to_json().matches("\"type\":\"scatter\"").count()
    }

    #[test]
    fn test_rank_abundance_traces() {
        let per_sample = RankAbundancePlot {
            log: true,
            average: false,
            alpha: 0.6,
        };
        assert_eq!(traces(&per_sample.generate(&table(), &grouping()).unwrap()), 3);

        let averaged = RankAbundancePlot {
            log: true,
            average: true,
            alpha: 0.6,
        };
        assert_eq!(traces(&averaged.generate(&table(), &grouping()).unwrap()), 2);
    }

    #[test]
    fn test_prevalence_filters_rare_features() {
        // Group x keeps f1 only, f3 is present in just half of its samples.
        // Group y keeps f2 and f3.
        let plot = plot_abundance_prevalence(&table(), &grouping(), false, 0.5).unwrap();
        assert_eq!(traces(&plot), 3);
    }

    #[test]
    fn test_average_prevalence_traces() {
        let plot = plot_abundance_prevalence_ave(&table(), &grouping(), true, 0.5).unwrap();
        assert_eq!(traces(&plot), 2);
        assert_eq!(traces(&plot_rank_abundance(&table(), &grouping(), true, true).unwrap()), 2);
    }

    #[test]
    fn test_average_prevalence_curve() {
        let plot = AbundancePrevalenceAveragePlot {
            log: false,
            step: 1.0,
            alpha: 0.5,
        };
        let (x, y) = plot.curve(&[0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(x, vec![0.0, 1.0, 2.0]);
        assert_eq!(y, vec![0.75, 0.5, 0.25]);
    }

    #[test]
    fn test_average_prevalence_rejects_bad_step() {
        for step in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let plot = AbundancePrevalenceAveragePlot {
                log: false,
                step,
                alpha: 0.5,
            };
            assert!(plot.curve(&[0.0, 1.0]).is_err());
        }

        let tiny = AbundancePrevalenceAveragePlot {
            log: false,
            step: 1e-12,
            alpha: 0.5,
        };
        assert!(tiny.curve(&[0.0, 1.0]).is_err());
    }

    #[test]
    fn test_average_prevalence_rejects_infinite_abundance() {
        let plot = AbundancePrevalenceAveragePlot {
            log: false,
            step: 0.5,
            alpha: 0.5,
        };
        assert!(plot.curve(&[0.0, f64::INFINITY]).is_err());
        assert!(plot.curve(&[f64::NAN, 1.0]).is_err());

        let mut table = table();
        table.data[2][1] = f64::INFINITY;
        assert!(plot_abundance_prevalence_ave(&table, &grouping(), false, 0.5).is_err());
    }

    #[test]
    fn test_average_prevalence_empty_values() {
        let plot = AbundancePrevalenceAveragePlot {
            log: false,
            step: 0.5,
            alpha: 0.5,
        };
        let (x, y) = plot.curve(&[]).unwrap();
        assert!(x.is_empty());
        assert!(y.is_empty());
    }

    #[test]
    fn test_errorbar_plot() {
        let plot = plot_with_errorbar(vec![1.0, 2.0], vec![3.0, 4.0], vec![0.5, 0.5]);
        let json = plot.to_json();
        assert_eq!(traces(&plot), 1);
        assert!(json.contains("error_y"));
    }
}

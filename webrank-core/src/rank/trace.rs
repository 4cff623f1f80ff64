//! Trace rendering for the focused page and its contributors.

use super::{DAMPING, sink::LineSink};

/// The share a single in-neighbour passes to the page being updated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Contribution {
    /// The neighbour ranked below the spam threshold and contributes nothing.
    Spam,
    /// The neighbour passes `sibling_factor * rank / out_degree`.
    Share {
        /// Sibling factor between the updated page and the neighbour.
        sibling_factor: f64,
        /// The neighbour's rank before the update.
        rank: f64,
        /// The neighbour's number of outgoing links.
        out_degree: usize,
    },
}

impl Contribution {
    /// Returns the numeric value of this contribution.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "out-degrees stay far below 2^52"
    )]
    pub fn value(&self) -> f64 {
        match *self {
            Self::Spam => 0.0,
            Self::Share {
                sibling_factor,
                rank,
                out_degree,
            } => sibling_factor * rank / out_degree as f64,
        }
    }

    fn render(&self) -> String {
        match *self {
            Self::Spam => " 0 ".to_owned(),
            Self::Share {
                sibling_factor,
                rank,
                out_degree,
            } => format!(" ({sibling_factor:.2} *({rank:.2} / {out_degree})) "),
        }
    }
}

/// Streams the symbolic update formula of the focused page into a sink.
pub(crate) struct FocusTracer<'s> {
    sink: &'s mut dyn LineSink,
}

impl<'s> FocusTracer<'s> {
    pub(crate) fn start(sink: &'s mut dyn LineSink, url: &str, initial_rank: f64) -> Self {
        sink.append_line(&format!(
            "++++++++++++++++++++  Focused webPage is {url} ++++++++++++++++++++ "
        ));
        sink.append_line(&format!("Initial Page Rank : {initial_rank:?}"));
        Self { sink }
    }

    pub(crate) fn record(
        &mut self,
        generation: usize,
        contributions: &[Contribution],
        new_rank: f64,
    ) {
        self.sink
            .append_line(&render_generation(generation, contributions, new_rank));
    }
}

/// Renders one generation of the focused page's update formula.
///
/// # Examples
/// ```
/// use webrank_core::{Contribution, render_generation};
///
/// let line = render_generation(
///     0,
///     &[
///         Contribution::Share { sibling_factor: 1.0, rank: 1.0, out_degree: 2 },
///         Contribution::Spam,
///     ],
///     0.6,
/// );
/// assert_eq!(
///     line,
///     "I : 0 --> (1 - 0.85) + 0.85*( (1.00 *(1.00 / 2)) + 0 ) = 0.60"
/// );
/// ```
#[must_use]
pub fn render_generation(generation: usize, contributions: &[Contribution], new_rank: f64) -> String {
    let terms: Vec<String> = contributions.iter().map(Contribution::render).collect();
    format!(
        "I : {generation} --> (1 - {DAMPING:.2}) + {DAMPING:.2}*({}) = {new_rank:.2}",
        terms.join("+")
    )
}

/// One observation of a contributor: its spam flag and rank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FactorSample {
    /// Whether the contributor ranked below the spam threshold.
    pub is_spam: bool,
    /// The contributor's rank.
    pub rank: f64,
}

/// The recorded history of one contributor of the focused page.
#[derive(Clone, Debug, PartialEq)]
pub struct FactorRow {
    url: String,
    samples: Vec<FactorSample>,
}

impl FactorRow {
    /// Returns the contributor URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the samples, starting with the state before the first generation.
    #[must_use]
    pub fn samples(&self) -> &[FactorSample] {
        &self.samples
    }
}

/// Per-generation history of every page linking to the focused page.
///
/// Contributors are fixed when the run starts. A run of `n` generations
/// records `n` samples per contributor: the initial state plus the state
/// after each generation except the last.
#[derive(Clone, Debug, PartialEq)]
pub struct FactorsTrace {
    focus: String,
    rows: Vec<FactorRow>,
}

impl FactorsTrace {
    pub(crate) fn new(focus: &str, contributors: impl IntoIterator<Item = String>) -> Self {
        Self {
            focus: focus.to_owned(),
            rows: contributors
                .into_iter()
                .map(|url| FactorRow {
                    url,
                    samples: Vec::new(),
                })
                .collect(),
        }
    }

    /// Appends one sample per contributor, in contributor order.
    pub(crate) fn push_samples(&mut self, samples: impl IntoIterator<Item = FactorSample>) {
        for (row, sample) in self.rows.iter_mut().zip(samples) {
            row.samples.push(sample);
        }
    }

    /// Returns the focused URL.
    #[must_use]
    pub fn focus(&self) -> &str {
        &self.focus
    }

    /// Returns one row per contributor, in page insertion order.
    #[must_use]
    pub fn rows(&self) -> &[FactorRow] {
        &self.rows
    }

    /// Renders the contributor table into `sink`.
    pub fn render(&self, sink: &mut dyn LineSink) {
        let width = self
            .rows
            .iter()
            .map(|row| row.url.len())
            .max()
            .unwrap_or_default();
        sink.append_line("");
        sink.append_line(&format!(
            "-------------------------- Page Ranks calculations of the factors that affect web page with URL : {} --------------------------",
            self.focus
        ));
        sink.append_line("");
        for row in &self.rows {
            let mut line = format!("{:<width$} : ", row.url);
            for (generation, sample) in row.samples.iter().enumerate() {
                let spam = u8::from(sample.is_spam);
                // the initial rank keeps its shortest form, e.g. `1.0`
                let cell = if generation == 0 {
                    format!("{spam}/ {:?}", sample.rank)
                } else {
                    format!("{spam}/ {:.2}", sample.rank)
                };
                line.push_str(&format!("{cell:<10} "));
            }
            sink.append_line(&line);
        }
        sink.append_line("<< Note >>  ( isSpam/ pageRank of each iteration )");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spam_terms_render_as_zero_placeholders() {
        let line = render_generation(
            4,
            &[
                Contribution::Spam,
                Contribution::Share {
                    sibling_factor: 0.5,
                    rank: 1.234,
                    out_degree: 3,
                },
            ],
            1.0,
        );
        assert_eq!(
            line,
            "I : 4 --> (1 - 0.85) + 0.85*( 0 + (0.50 *(1.23 / 3)) ) = 1.00"
        );
    }

    #[test]
    fn generation_without_contributors_renders_empty_sum() {
        assert_eq!(
            render_generation(0, &[], 0.15),
            "I : 0 --> (1 - 0.85) + 0.85*() = 0.15"
        );
    }

    #[test]
    fn contribution_values() {
        assert_eq!(Contribution::Spam.value(), 0.0);
        let share = Contribution::Share {
            sibling_factor: 0.5,
            rank: 1.0,
            out_degree: 2,
        };
        assert_eq!(share.value(), 0.25);
    }

    #[test]
    fn factors_table_prints_initial_rank_then_two_decimals() {
        let mut trace = FactorsTrace::new("t/x", ["a/long".to_owned(), "b/s".to_owned()]);
        trace.push_samples([
            FactorSample {
                is_spam: false,
                rank: 1.0,
            },
            FactorSample {
                is_spam: true,
                rank: 0.2,
            },
        ]);
        trace.push_samples([
            FactorSample {
                is_spam: false,
                rank: 0.432,
            },
            FactorSample {
                is_spam: true,
                rank: 0.2,
            },
        ]);
        let mut lines: Vec<String> = Vec::new();
        trace.render(&mut lines);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "");
        assert!(lines[1].contains("affect web page with URL : t/x"));
        assert_eq!(lines[3], "a/long : 0/ 1.0     0/ 0.43    ");
        assert_eq!(lines[4], "b/s    : 1/ 0.2     1/ 0.20    ");
        assert_eq!(
            lines[5],
            "<< Note >>  ( isSpam/ pageRank of each iteration )"
        );
    }
}

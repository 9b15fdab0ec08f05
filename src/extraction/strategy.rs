//! Line strategies: ordered, data-driven ways of cutting lines into records

use regex::Regex;

use super::fields::{Field, RawFields};
use super::noise::NoiseFilter;
use crate::normalize::collapse_whitespace;

/// Accessor for a lazily compiled pattern
pub type PatternFn = fn() -> &'static Regex;

/// Lines kept in front of a closing line by [`LineStrategy::Leading`]
const LEADING_BUFFER_LINES: usize = 2;

/// One way of turning a sequence of lines into candidate records
#[derive(Debug, Clone, Copy)]
pub enum LineStrategy {
    /// Every record fits on one line
    SingleLine { name: &'static str, pattern: PatternFn },
    /// A head line opens the record, free text may continue on the following
    /// lines, and a tail line (or the head's own remainder) closes it
    Trailing {
        name: &'static str,
        head: PatternFn,
        tail: PatternFn,
    },
    /// Free text wrapped onto the lines before the closing line
    Leading { name: &'static str, tail: PatternFn },
}

/// Per-run settings handed to a strategy
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    /// Field collecting continuation text
    pub text_field: Field,
    /// Header/footer filter; noise lines never join a record
    pub noise: &'a NoiseFilter,
    /// Continuation lines allowed before an open record is abandoned
    pub max_continuation: usize,
}

impl LineStrategy {
    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            LineStrategy::SingleLine { name, .. }
            | LineStrategy::Trailing { name, .. }
            | LineStrategy::Leading { name, .. } => *name,
        }
    }

    /// Cut `lines` into candidate records
    pub fn apply(&self, lines: &[String], ctx: &StrategyContext<'_>) -> Vec<RawFields> {
        match *self {
            LineStrategy::SingleLine { pattern, .. } => lines
                .iter()
                .filter_map(|line| pattern().captures(line))
                .map(|caps| RawFields::from_captures(&caps))
                .collect(),
            LineStrategy::Trailing { head, tail, .. } => apply_trailing(lines, head(), tail(), ctx),
            LineStrategy::Leading { tail, .. } => apply_leading(lines, tail(), ctx),
        }
    }
}

fn apply_trailing(
    lines: &[String],
    head: &Regex,
    tail: &Regex,
    ctx: &StrategyContext<'_>,
) -> Vec<RawFields> {
    let mut records = Vec::new();
    // Open record and the number of continuation lines it has absorbed
    let mut open: Option<(RawFields, usize)> = None;

    for line in lines {
        if let Some(caps) = head.captures(line) {
            // A new head abandons an unclosed record
            let mut fields = RawFields::from_captures(&caps);
            let rest = fields.take(ctx.text_field).unwrap_or_default();

            match tail.captures(&rest) {
                Some(tail_caps) => {
                    fields.merge(RawFields::from_captures(&tail_caps), ctx.text_field);
                    records.push(fields);
                    open = None;
                }
                None => {
                    fields.append(ctx.text_field, &rest);
                    open = Some((fields, 0));
                }
            }
            continue;
        }

        let Some((mut fields, continued)) = open.take() else {
            continue;
        };

        if let Some(tail_caps) = tail.captures(line) {
            fields.merge(RawFields::from_captures(&tail_caps), ctx.text_field);
            records.push(fields);
        } else if ctx.noise.is_noise_line(line) {
            open = Some((fields, continued));
        } else if continued < ctx.max_continuation {
            fields.append(ctx.text_field, line);
            open = Some((fields, continued + 1));
        }
    }

    records
}

fn apply_leading(lines: &[String], tail: &Regex, ctx: &StrategyContext<'_>) -> Vec<RawFields> {
    let mut records = Vec::new();
    let mut buffer: Vec<&str> = Vec::with_capacity(LEADING_BUFFER_LINES);

    for line in lines {
        if let Some(caps) = tail.captures(line) {
            let mut fields = RawFields::from_captures(&caps);
            // A leading status token opens the entry, so nothing above belongs to it
            if fields.get(Field::Status).is_some() {
                buffer.clear();
            }
            for text in buffer.drain(..).rev() {
                fields.prepend(ctx.text_field, text);
            }
            records.push(fields);
        } else if ctx.noise.is_noise_line(line) {
            buffer.clear();
        } else {
            if buffer.len() == LEADING_BUFFER_LINES {
                buffer.remove(0);
            }
            buffer.push(line);
        }
    }

    records
}

/// Split text into whitespace-normalized, non-empty lines
pub fn tokenize(text: &str) -> Vec<String> {
    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Try `strategies` in order and keep the first one yielding a built record.
///
/// Returns the winning strategy name with its records, or `None` when every
/// strategy came back empty.
pub(crate) fn run_strategies<T>(
    strategies: &[LineStrategy],
    lines: &[String],
    ctx: &StrategyContext<'_>,
    mut build: impl FnMut(RawFields) -> Option<T>,
) -> Option<(&'static str, Vec<T>)> {
    strategies.iter().find_map(|strategy| {
        let records: Vec<T> = strategy
            .apply(lines, ctx)
            .into_iter()
            .filter_map(&mut build)
            .collect();

        tracing::debug!(
            strategy = strategy.name(),
            records = records.len(),
            "Applied line strategy"
        );

        (!records.is_empty()).then(|| (strategy.name(), records))
    })
}

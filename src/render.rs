//! Plain-text output for the CLI.

use std::fmt::Write;

use crate::query::AggregationResult;
use crate::report::LoadSummary;

/// `1234567` -> `"1,234,567"`.
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One line per state, a rule, then the grand total.
pub fn render_totals(result: &AggregationResult) -> String {
    let mut out = String::new();
    for (state, pop) in &result.per_state {
        let _ = writeln!(out, "{:<25} {}", state, thousands(*pop));
    }
    let _ = writeln!(out, "{}", "-".repeat(34));
    let _ = writeln!(out, "{:<25} {}", "Grand Total", thousands(result.grand_total()));
    out
}

pub fn render_summary(summary: &LoadSummary) -> String {
    let mut out = String::new();
    let latest = summary
        .latest_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n/a".to_string());

    let _ = writeln!(out, "Total rows:          {}", thousands(summary.total_rows as i64));
    let _ = writeln!(out, "Distinct cities:     {}", thousands(summary.distinct_cities as i64));
    let _ = writeln!(out, "Distinct states:     {}", thousands(summary.distinct_states as i64));
    let _ = writeln!(out, "Latest year present: {latest}");
    let _ = writeln!(out, "Rows per year:");
    for (year, count) in &summary.rows_per_year {
        let _ = writeln!(out, "  {year}: {}", thousands(*count as i64));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Random {}-row sample:", crate::report::SAMPLE_SIZE);
    let _ = writeln!(out, "city | state | year | population");
    let _ = writeln!(out, "{}", "-".repeat(40));
    for r in &summary.sample {
        let _ = writeln!(
            out,
            "{} | {} | {} | {}",
            r.city,
            r.state,
            r.year,
            thousands(i64::from(r.population))
        );
    }
    out
}

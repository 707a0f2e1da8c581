//! Text report
//!
//! Formats a [`ChainAnalysis`] for the terminal. Number formatting lives here
//! and nowhere else.

use std::fmt;

use chrono::DateTime;

use crate::analytics::{ActivityTier, ChainAnalysis, StrikeBucket};
use crate::data::find_etf;

/// Term explanations shown with `--explain`
pub const GLOSSARY: [(&str, &str); 7] = [
    ("CALL option", "Right to buy at the strike. Bought when expecting the price to rise."),
    ("PUT option", "Right to sell at the strike. Bought when expecting the price to fall."),
    ("Volume", "Contracts traded today."),
    ("Open interest (OI)", "Total contracts still open (not yet closed)."),
    ("Put/Call ratio", "Put volume / call volume. Above 1 leans bearish, below 1 leans bullish."),
    ("Unusual activity", "Volume high relative to open interest (Vol/OI > threshold); a large new position may have been opened."),
    ("Implied volatility (IV)", "Volatility implied by the option price. Higher IV means pricier options."),
];

/// Compact contract count: `1.23M`, `4.5K`, `950`
pub fn format_number(n: i64) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// US dollar price with thousands separators, `$0.00` when absent
pub fn format_price(price: Option<f64>) -> String {
    let price = match price {
        Some(p) if p.is_finite() => p,
        _ => return "$0.00".to_string(),
    };

    let formatted = format!("{:.2}", price.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let sign = if price < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// Session change with direction arrow: `▲ 1.23%`
pub fn format_change(percent: f64) -> String {
    let arrow = if percent >= 0.0 { '▲' } else { '▼' };
    format!("{} {:.2}%", arrow, percent.abs())
}

/// Expiration as `Jan 17`
pub fn format_expiration(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%b %-d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Implied volatility as a whole percentage, `-` when absent
pub fn format_iv(iv: Option<f64>) -> String {
    match iv {
        Some(v) if v > 0.0 => format!("{:.0}%", v * 100.0),
        _ => "-".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Full report for one analysed chain
pub struct Report<'a> {
    analysis: &'a ChainAnalysis,
    threshold: f64,
    explain: bool,
}

impl<'a> Report<'a> {
    pub fn new(analysis: &'a ChainAnalysis, threshold: f64) -> Self {
        Self {
            analysis,
            threshold,
            explain: false,
        }
    }

    /// Append the glossary
    pub fn with_glossary(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.analysis;
        match find_etf(&a.symbol) {
            Some(etf) => writeln!(f, "{} - {}", etf.symbol, etf.name)?,
            None => writeln!(f, "{}", a.symbol)?,
        }

        if let Some(quote) = &a.quote {
            write!(f, "Price: {}", format_price(quote.regular_market_price))?;
            if let Some(change) = quote.regular_market_change_percent {
                write!(f, "  {}", format_change(change))?;
            }
            writeln!(f)?;
        }
        if let Some(expiration) = a.expiration {
            writeln!(f, "Expiration: {}", format_expiration(expiration))?;
        }
        writeln!(f)
    }

    fn write_stats(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.analysis.summary;
        writeln!(f, "{:<18}{:>10}", "CALL volume", format_number(s.total_call_volume))?;
        writeln!(f, "{:<18}{:>10}", "PUT volume", format_number(s.total_put_volume))?;
        writeln!(f, "{:<18}{:>10.2}", "Put/Call ratio", s.put_call_ratio)?;
        if s.total_volume() != 0 {
            let share = s.call_volume_share() * 100.0;
            let split = format!("{:.0}% / {:.0}%", share, 100.0 - share);
            writeln!(f, "{:<18}{:>10}", "Call/Put share", split)?;
        }
        writeln!(f, "{:<18}{:>10}", "Open interest", format_number(s.total_open_interest()))?;
        writeln!(f, "{:<18}{:>10}", "Unusual trades", self.analysis.unusual.len())?;
        writeln!(f)
    }

    fn write_strike_table(
        f: &mut fmt::Formatter<'_>,
        title: &str,
        rows: &[StrikeBucket],
        value: fn(&StrikeBucket) -> (i64, i64),
    ) -> fmt::Result {
        writeln!(f, "{}", title)?;
        if rows.is_empty() {
            return writeln!(f, "  (no strikes)\n");
        }

        writeln!(f, "  {:>10} {:>10} {:>10}", "Strike", "CALL", "PUT")?;
        for row in rows {
            let (call, put) = value(row);
            writeln!(
                f,
                "  {:>10} {:>10} {:>10}",
                format_price(Some(row.strike)),
                format_number(call),
                format_number(put)
            )?;
        }
        writeln!(f)
    }

    fn write_unusual(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Unusual activity (Vol/OI > {:.2})", self.threshold)?;
        if self.analysis.unusual.is_empty() {
            return writeln!(f, "  No unusual activity detected");
        }

        writeln!(
            f,
            "  {:<5} {:>10} {:>9} {:>9} {:>8} {:>9} {:>5}",
            "Type", "Strike", "Volume", "OI", "Vol/OI", "Last", "IV"
        )?;
        for entry in &self.analysis.unusual {
            let marker = match entry.tier() {
                ActivityTier::Extreme => "*",
                ActivityTier::Elevated => " ",
            };
            let last = entry
                .record
                .last_price
                .map(|p| format_price(Some(p)))
                .unwrap_or_else(|| "-".to_string());

            writeln!(
                f,
                "  {:<5} {:>10} {:>9} {:>9} {:>7.2}x{} {:>8} {:>5}",
                entry.side.label(),
                format_price(Some(entry.strike())),
                format_number(entry.volume()),
                format_number(entry.open_interest()),
                entry.ratio(),
                marker,
                last,
                format_iv(entry.record.implied_volatility)
            )?;
        }
        writeln!(f, "  (* volume exceeds open interest)")
    }

    fn write_glossary(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\nGlossary")?;
        for (term, desc) in GLOSSARY {
            writeln!(f, "  {}: {}", term, desc)?;
        }
        Ok(())
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_header(f)?;
        self.write_stats(f)?;
        Self::write_strike_table(
            f,
            "Volume by strike",
            &self.analysis.volume_by_strike,
            |b| (b.call_volume, b.put_volume),
        )?;
        Self::write_strike_table(
            f,
            "Open interest by strike",
            &self.analysis.open_interest_by_strike,
            |b| (b.call_open_interest, b.put_open_interest),
        )?;
        self.write_unusual(f)?;
        if self.explain {
            Self::write_glossary(f)?;
        }
        Ok(())
    }
}

/// Render a report with the default layout
pub fn render_report(analysis: &ChainAnalysis, threshold: f64) -> String {
    Report::new(analysis, threshold).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::analyze_chain;
    use crate::core::{Chain, ChainQuote, ContractRecord};

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(950), "950");
        assert_eq!(format_number(4_260), "4.3K");
        assert_eq!(format_number(1_234_567), "1.23M");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(52.369)), "$52.37");
        assert_eq!(format_price(Some(1234.5)), "$1,234.50");
        assert_eq!(format_price(Some(1_000_000.0)), "$1,000,000.00");
        assert_eq!(format_price(None), "$0.00");
    }

    #[test]
    fn test_format_change_and_iv() {
        assert_eq!(format_change(1.234), "▲ 1.23%");
        assert_eq!(format_change(-0.5), "▼ 0.50%");
        assert_eq!(format_iv(Some(0.62)), "62%");
        assert_eq!(format_iv(None), "-");
    }

    #[test]
    fn test_format_expiration() {
        assert_eq!(format_expiration(1_737_072_000), "Jan 17");
    }

    #[test]
    fn test_report_sections() {
        let mut chain = Chain::new("IBIT")
            .with_expiration(1_737_072_000)
            .with_quote(ChainQuote {
                regular_market_price: Some(52.37),
                regular_market_change_percent: Some(-1.84),
                ..Default::default()
            });
        chain.add_call(
            ContractRecord::new(50.0)
                .with_volume(4200)
                .with_open_interest(3000)
                .with_last_price(3.1),
        );
        chain.add_put(ContractRecord::new(45.0).with_volume(150).with_open_interest(900));

        let text = render_report(&analyze_chain(&chain), 0.5);
        assert!(text.starts_with("IBIT - BlackRock Bitcoin ETF"));
        assert!(text.contains("Price: $52.37  ▼ 1.84%"));
        assert!(text.contains("Expiration: Jan 17"));
        assert!(text.contains("Volume by strike"));
        assert!(text.contains("1.40x*"));
        assert!(text.contains("Call/Put share"));
        assert!(text.contains("97% / 3%"));
        assert!(!text.contains("Glossary"));
    }

    #[test]
    fn test_report_without_unusual_activity() {
        let mut chain = Chain::new("GBTC");
        chain.add_call(ContractRecord::new(60.0).with_volume(1).with_open_interest(100));

        let analysis = analyze_chain(&chain);
        let text = Report::new(&analysis, 0.5).with_glossary(true).to_string();
        assert!(text.contains("No unusual activity detected"));
        assert!(text.contains("Call/Put share"));
        assert!(text.contains("100% / 0%"));
        assert!(text.contains("Glossary"));
    }
}

use serde::Serialize;

use crate::aggregation::AnalysisResults;
use crate::collection::{JobDescriptionData, SourceTokens};
use crate::rewrite::RewriteResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerCategory {
    Collection,
    JobDescription,
    Analysis,
    Rewrite,
}

/// Tokens of one unit of work, recorded exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub category: LedgerCategory,
    pub label: &'static str,
    pub tokens: u64,
}

/// Additive-only record of every token spent in one request.
///
/// Entries are appended by whoever owns the work (a collector, the JD call, a
/// field aggregator, a rewrite agent) and only ever summed here, so no figure
/// can be counted twice by a downstream consumer.
///
/// The ledger only sees tokens of work that returned. A call still in flight
/// when its task is aborted at the deadline, or inside an aggregator that
/// panicked, records 0 even though the provider may have billed it, so
/// `grand_total` can undercount what was actually spent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenLedger {
    entries: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenSummary {
    pub collection_tokens: u64,
    pub jd_tokens: u64,
    pub analysis_tokens: u64,
    pub grand_total: u64,
}

impl TokenLedger {
    pub fn record(&mut self, category: LedgerCategory, label: &'static str, tokens: u64) {
        self.entries.push(LedgerEntry {
            category,
            label,
            tokens,
        });
    }

    pub fn record_sources(&mut self, tokens: &SourceTokens) {
        for (label, value) in [
            ("resume", tokens.resume),
            ("linkedin", tokens.linkedin),
            ("github", tokens.github),
            ("portfolio", tokens.portfolio),
            ("other_link", tokens.other_link),
        ] {
            self.record(LedgerCategory::Collection, label, value);
        }
    }

    pub fn record_job_description(&mut self, jd: &JobDescriptionData) {
        self.record(LedgerCategory::JobDescription, "job_description", jd.tokens);
    }

    pub fn record_fields(&mut self, analysis: &AnalysisResults) {
        for field in analysis.fields.values() {
            self.record(LedgerCategory::Analysis, field.kind.as_str(), field.tokens);
        }
    }

    pub fn record_rewrite(&mut self, rewrite: &RewriteResults) {
        for section in rewrite.sections.values() {
            self.record(LedgerCategory::Rewrite, section.section.as_str(), section.tokens);
        }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn total_for(&self, category: LedgerCategory) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.tokens)
            .sum()
    }

    pub fn grand_total(&self) -> u64 {
        self.entries.iter().map(|e| e.tokens).sum()
    }

    pub fn summary(&self) -> TokenSummary {
        TokenSummary {
            collection_tokens: self.total_for(LedgerCategory::Collection),
            jd_tokens: self.total_for(LedgerCategory::JobDescription),
            analysis_tokens: self.total_for(LedgerCategory::Analysis),
            grand_total: self.grand_total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::aggregation::{AggregatedField, FieldKind};

    #[test]
    fn test_summary_splits_by_category() {
        let mut ledger = TokenLedger::default();
        ledger.record_sources(&SourceTokens {
            resume: 1_000,
            linkedin: 500,
            github: 300,
            portfolio: 0,
            other_link: 200,
        });
        ledger.record_job_description(&JobDescriptionData {
            tokens: 150,
            ..JobDescriptionData::default()
        });

        let fields: BTreeMap<FieldKind, AggregatedField> = FieldKind::ALL
            .into_iter()
            .map(|kind| {
                let mut field = AggregatedField::empty(kind);
                field.tokens = 10;
                (kind, field)
            })
            .collect();
        ledger.record_fields(&AnalysisResults {
            fields,
            total_tokens: 80,
            timed_out: false,
            used_fallback: false,
        });

        let summary = ledger.summary();
        assert_eq!(summary.collection_tokens, 2_000);
        assert_eq!(summary.jd_tokens, 150);
        assert_eq!(summary.analysis_tokens, 80);
        assert_eq!(summary.grand_total, 2_230);
        assert_eq!(ledger.entries().len(), 5 + 1 + 8);
    }

    #[test]
    fn test_rewrite_tokens_count_toward_grand_total_only() {
        use crate::rewrite::{RewriteSection, RewrittenSection};

        let sections = RewriteSection::ALL
            .into_iter()
            .map(|section| {
                let mut rewritten = RewrittenSection::empty(section);
                rewritten.tokens = 5;
                (section, rewritten)
            })
            .collect();
        let mut ledger = TokenLedger::default();
        ledger.record_rewrite(&RewriteResults {
            sections,
            total_tokens: 35,
            timed_out: false,
        });

        assert_eq!(ledger.total_for(LedgerCategory::Rewrite), 35);
        assert_eq!(ledger.summary().analysis_tokens, 0);
        assert_eq!(ledger.summary().grand_total, 35);
        assert_eq!(ledger.entries()[0].label, "personal_info");
    }

    #[test]
    fn test_empty_ledger_is_zero() {
        assert_eq!(TokenLedger::default().summary(), TokenSummary::default());
    }
}

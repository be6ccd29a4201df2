use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use kira_core::{Category, CoverageStatus, Direction, Money, Month, StatutoryType, VolatilityLevel};
use regex::Regex;

use crate::input::AnalysisInput;
use crate::missing_bank::MissingBanks;
use crate::normalize::Txn;
use crate::report::*;
use crate::tables::RuleTables;
use crate::transfer::{MatchedTransfer, UnverifiedTransfer};

/// Intraday swing relative to the average balance, bucketed.
///
/// Equal high/low and zero averages are defined as (0.0, LOW) — flat or
/// empty months are calm, not errors.
pub fn calculate_volatility(high: Money, low: Money) -> (f64, VolatilityLevel) {
    if high == low {
        return (0.0, VolatilityLevel::Low);
    }
    let (high, low) = (high.to_f64(), low.to_f64());
    let avg = (high + low) / 2.0;
    if avg == 0.0 {
        return (0.0, VolatilityLevel::Low);
    }
    let pct = round2((high - low) / avg * 100.0);
    (pct, VolatilityLevel::from_percent(pct))
}

/// FOUND needs near-complete monthly coverage; one or two gaps are allowed
/// on longer statement runs.
pub fn coverage_status(found: usize, expected: usize) -> CoverageStatus {
    if expected == 0 {
        CoverageStatus::NotApplicable
    } else if found >= 4.max(expected.saturating_sub(2)) {
        CoverageStatus::Found
    } else if found >= 1 {
        CoverageStatus::Partial
    } else {
        CoverageStatus::NotFound
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Leading transfer-channel noise stripped before grouping counterparties.
const COUNTERPARTY_PREFIX: &str =
    r"^(DUITNOW TO ACCOUNT|DUITNOW TRANSFER|IBG TRANSFER|INSTANT TRANSFER|TR TO C/A|TR FROM CA)\s*";

pub struct Aggregator<'a> {
    tables: &'a RuleTables,
    counterparty_prefix: Regex,
}

impl<'a> Aggregator<'a> {
    pub fn new(tables: &'a RuleTables) -> Self {
        Aggregator {
            tables,
            counterparty_prefix: Regex::new(COUNTERPARTY_PREFIX)
                .expect("counterparty prefix pattern is valid"),
        }
    }

    pub fn build_report(
        &self,
        input: &AnalysisInput,
        txns: &[Txn],
        matched: Vec<MatchedTransfer>,
        unverified: Vec<UnverifiedTransfer>,
        missing: &MissingBanks,
        generated_at: DateTime<Utc>,
    ) -> AnalysisReport {
        let gross = self.gross_totals(txns);
        let exclusions = self.exclusions(txns);
        let business_turnover = SideTotals {
            total_credits: gross.total_credits - exclusions.total_credits,
            total_debits: gross.total_debits - exclusions.total_debits,
        };

        let months = self.months_spanned(txns);
        let flags = self.round_figures(txns, gross.total_credits);
        let statutory_coverage = self.statutory_coverage(txns, months.len());
        let (accounts, month_levels, global_high, global_low) = self.account_reports(input);

        let volatility = match (global_high, global_low) {
            (Some(high), Some(low)) => {
                let (pct, level) = calculate_volatility(high, low);
                VolatilitySummary { overall_pct: pct, overall_level: level }
            }
            _ => VolatilitySummary { overall_pct: 0.0, overall_level: VolatilityLevel::Low },
        };

        let integrity_score = self.integrity_score(
            &month_levels,
            volatility.overall_level,
            flags.round_figure_pct,
            &statutory_coverage,
            missing,
        );

        AnalysisReport {
            report_info: ReportInfo {
                company_name: input.config.company_name.clone(),
                generated_at,
                period: self.period(txns),
                total_accounts: accounts.len(),
                total_transactions: txns.len(),
                month_count: months.len(),
                missing_bank_accounts: missing
                    .occurrences
                    .iter()
                    .map(|(label, occurrences)| MissingBankAccount {
                        label: label.clone(),
                        occurrences: *occurrences,
                    })
                    .collect(),
            },
            consolidated: Consolidated { gross, exclusions, business_turnover },
            transfers: TransferSection { matched, unverified },
            related_party_transactions: self.related_party_section(txns),
            categories: self.category_section(txns, gross.total_credits, gross.total_debits),
            counterparties: self.counterparty_section(txns),
            flags,
            statutory_coverage,
            volatility,
            integrity_score,
            accounts,
        }
    }

    fn period(&self, txns: &[Txn]) -> String {
        let start = txns.iter().map(|t| t.date).min();
        let end = txns.iter().map(|t| t.date).max();
        match (start, end) {
            (Some(s), Some(e)) => format!("{s} - {e}"),
            _ => String::new(),
        }
    }

    fn months_spanned(&self, txns: &[Txn]) -> BTreeSet<Month> {
        txns.iter().map(Txn::month).collect()
    }

    fn gross_totals(&self, txns: &[Txn]) -> SideTotals {
        SideTotals {
            total_credits: txns.iter().map(|t| t.credit).sum(),
            total_debits: txns.iter().map(|t| t.debit).sum(),
        }
    }

    fn exclusions(&self, txns: &[Txn]) -> Exclusions {
        const CREDIT_REASONS: [Category; 6] = [
            Category::InterAccountTransfer,
            Category::UnverifiedTransfer,
            Category::RelatedParty,
            Category::LoanDisbursement,
            Category::InterestProfitDividend,
            Category::Reversal,
        ];
        const DEBIT_REASONS: [Category; 3] = [
            Category::InterAccountTransfer,
            Category::UnverifiedTransfer,
            Category::RelatedParty,
        ];

        let breakdown = |direction: Direction, reasons: &[Category]| -> Vec<ExclusionEntry> {
            reasons
                .iter()
                .map(|&reason| {
                    let lines = txns.iter().filter(|t| {
                        t.direction() == direction
                            && t.exclude_from_turnover
                            && t.category == Some(reason)
                    });
                    let mut amount = Money::zero();
                    let mut count = 0;
                    for t in lines {
                        amount += t.amount();
                        count += 1;
                    }
                    ExclusionEntry { reason, amount, count }
                })
                .collect()
        };

        let credit_breakdown = breakdown(Direction::Credit, &CREDIT_REASONS);
        let debit_breakdown = breakdown(Direction::Debit, &DEBIT_REASONS);
        Exclusions {
            total_credits: credit_breakdown.iter().map(|e| e.amount).sum(),
            total_debits: debit_breakdown.iter().map(|e| e.amount).sum(),
            credit_breakdown,
            debit_breakdown,
        }
    }

    fn related_party_section(&self, txns: &[Txn]) -> RelatedPartySection {
        let mut details = Vec::new();
        let mut total_credits = Money::zero();
        let mut total_debits = Money::zero();

        for txn in txns {
            let Some(tag) = &txn.related_party else { continue };
            match txn.direction() {
                Direction::Credit => total_credits += txn.amount(),
                Direction::Debit => total_debits += txn.amount(),
            }
            details.push(RelatedPartyDetail {
                date: txn.date,
                party: tag.name.clone(),
                relationship: tag.relationship.clone(),
                amount: txn.amount(),
                direction: txn.direction(),
                purpose: tag.purpose.clone(),
            });
        }

        // txns are in sorted (date-first) order already; make the date sort
        // explicit anyway since this list is a user-facing contract.
        details.sort_by(|a, b| a.date.cmp(&b.date));
        RelatedPartySection {
            count: details.len(),
            total_credits,
            total_debits,
            details,
        }
    }

    fn category_section(
        &self,
        txns: &[Txn],
        gross_credits: Money,
        gross_debits: Money,
    ) -> CategorySection {
        let side = |direction: Direction, basis: Money| -> Vec<CategoryBreakdown> {
            let mut stats: BTreeMap<Category, (usize, Money, Vec<TransactionDigest>)> =
                BTreeMap::new();
            for txn in txns.iter().filter(|t| t.direction() == direction) {
                let Some(category) = txn.category else { continue };
                let entry = stats.entry(category).or_insert((0, Money::zero(), Vec::new()));
                entry.0 += 1;
                entry.1 += txn.amount();
                entry.2.push(TransactionDigest {
                    date: txn.date,
                    description: txn.description.clone(),
                    amount: txn.amount(),
                });
            }
            stats
                .into_iter()
                .map(|(category, (count, amount, mut digests))| {
                    digests.sort_by(|a, b| {
                        b.amount
                            .cmp(&a.amount)
                            .then_with(|| a.date.cmp(&b.date))
                            .then_with(|| a.description.cmp(&b.description))
                    });
                    digests.truncate(5);
                    CategoryBreakdown {
                        category,
                        count,
                        amount,
                        percentage: round2(amount.percent_of(basis)),
                        top_transactions: digests,
                    }
                })
                .collect()
        };

        CategorySection {
            credits: side(Direction::Credit, gross_credits),
            debits: side(Direction::Debit, gross_debits),
        }
    }

    /// Group descriptions on their first four words after stripping the
    /// transfer-channel prefix, and keep the ten largest groups per side.
    fn counterparty_section(&self, txns: &[Txn]) -> CounterpartySection {
        let side = |direction: Direction| -> Vec<CounterpartyEntry> {
            let mut groups: BTreeMap<String, (usize, Money)> = BTreeMap::new();
            for txn in txns.iter().filter(|t| t.direction() == direction) {
                let key = self.normalize_counterparty(&txn.description_upper);
                let entry = groups.entry(key).or_insert((0, Money::zero()));
                entry.0 += 1;
                entry.1 += txn.amount();
            }
            let mut entries: Vec<CounterpartyEntry> = groups
                .into_iter()
                .map(|(name, (count, amount))| CounterpartyEntry { name, amount, count })
                .collect();
            entries.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
            entries.truncate(10);
            entries
        };

        CounterpartySection {
            top_payers: side(Direction::Credit),
            top_payees: side(Direction::Debit),
        }
    }

    fn normalize_counterparty(&self, description_upper: &str) -> String {
        let clean = self.counterparty_prefix.replace(description_upper, "");
        let words: Vec<&str> = clean.split_whitespace().take(4).collect();
        if words.is_empty() {
            description_upper.chars().take(30).collect()
        } else {
            words.join(" ")
        }
    }

    /// Large, suspiciously even credits — only genuine sales qualify, the
    /// excluded categories are already accounted for elsewhere.
    fn round_figures(&self, txns: &[Txn], gross_credits: Money) -> FlagSection {
        let min = self.tables.thresholds.round_figure_min;
        let step = self.tables.thresholds.round_figure_step;
        let mut round_figures = Vec::new();
        let mut total = Money::zero();

        for txn in txns.iter().filter(|t| {
            t.category == Some(Category::GenuineSalesCollections)
                && t.direction() == Direction::Credit
        }) {
            let amount = txn.amount();
            if amount >= min && amount.is_multiple_of_units(step) {
                total += amount;
                round_figures.push(RoundFigureFlag {
                    date: txn.date,
                    description: txn.description.clone(),
                    amount,
                    account_id: txn.account_id.clone(),
                });
            }
        }

        FlagSection {
            round_figures,
            round_figure_total: total,
            round_figure_pct: round2(total.percent_of(gross_credits)),
        }
    }

    fn statutory_coverage(&self, txns: &[Txn], expected_months: usize) -> Vec<StatutoryCoverage> {
        let mut by_kind: BTreeMap<StatutoryType, BTreeSet<Month>> = BTreeMap::new();
        for txn in txns {
            if let Some(kind) = txn.statutory {
                by_kind.entry(kind).or_default().insert(txn.month());
            }
        }

        StatutoryType::ALL
            .into_iter()
            .map(|kind| {
                let months: Vec<Month> =
                    by_kind.get(&kind).map(|m| m.iter().copied().collect()).unwrap_or_default();
                let status = coverage_status(months.len(), expected_months);
                StatutoryCoverage {
                    kind,
                    expected_months,
                    status,
                    months_found: months,
                }
            })
            .collect()
    }

    /// Per-account monthly reports plus the inputs for overall volatility:
    /// every month's level, the global highest high and the global lowest low.
    #[allow(clippy::type_complexity)]
    fn account_reports(
        &self,
        input: &AnalysisInput,
    ) -> (Vec<AccountReport>, Vec<VolatilityLevel>, Option<Money>, Option<Money>) {
        let mut accounts = Vec::new();
        let mut levels = Vec::new();
        let mut global_high: Option<Money> = None;
        let mut global_low: Option<Money> = None;

        for (account_id, info) in &input.accounts {
            let Some(statement) = input.statements.get(account_id) else {
                continue; // statement never uploaded — intentional silent skip
            };

            let mut monthly = Vec::new();
            let mut total_credits = Money::zero();
            let mut total_debits = Money::zero();

            for m in &statement.monthly_summary {
                let (pct, level) = calculate_volatility(m.highest_balance, m.lowest_balance);
                levels.push(level);
                global_high = Some(global_high.map_or(m.highest_balance, |h| h.max(m.highest_balance)));
                global_low = Some(global_low.map_or(m.lowest_balance, |l| l.min(m.lowest_balance)));

                monthly.push(MonthlyReport {
                    month: m.month,
                    opening: m.ending_balance - m.net_change,
                    credits: m.total_credit,
                    debits: m.total_debit,
                    closing: m.ending_balance,
                    highest_intraday: m.highest_balance,
                    lowest_intraday: m.lowest_balance,
                    volatility_pct: pct,
                    volatility_level: level,
                });
                total_credits += m.total_credit;
                total_debits += m.total_debit;
            }

            accounts.push(AccountReport {
                account_id: account_id.clone(),
                bank_name: info.bank_name.clone(),
                account_number: info.account_number.clone(),
                total_credits,
                total_debits,
                closing_balance: statement
                    .monthly_summary
                    .last()
                    .map(|m| m.ending_balance)
                    .unwrap_or_default(),
                monthly_summary: monthly,
            });
        }

        (accounts, levels, global_high, global_low)
    }

    fn integrity_score(
        &self,
        month_levels: &[VolatilityLevel],
        overall_level: VolatilityLevel,
        round_figure_pct: f64,
        statutory_coverage: &[StatutoryCoverage],
        missing: &MissingBanks,
    ) -> IntegrityScore {
        let elevated =
            overall_level.is_elevated() || month_levels.iter().any(|l| l.is_elevated());
        let round_ok = round_figure_pct <= self.tables.thresholds.round_figure_fail_pct;
        let statutory_ok = statutory_coverage
            .iter()
            .any(|c| c.status == CoverageStatus::Found);
        let complete = missing.is_empty();

        let check = |id: u32, name: &str, pass: bool, max: u32, detail: String| IntegrityCheck {
            id,
            name: name.to_string(),
            status: if pass { CheckStatus::Pass } else { CheckStatus::Fail },
            points: if pass { max } else { 0 },
            max_points: max,
            details: detail,
        };

        let checks = vec![
            check(
                1,
                "Volatility Level",
                !elevated,
                2,
                if elevated {
                    "High balance volatility detected".to_string()
                } else {
                    "Volatility within limits".to_string()
                },
            ),
            check(
                2,
                "Round Figure %",
                round_ok,
                2,
                format!("Round figures are {round_figure_pct}% of gross credits"),
            ),
            check(
                3,
                "Statutory Coverage",
                statutory_ok,
                3,
                if statutory_ok {
                    "Recurring statutory payments present".to_string()
                } else {
                    "No statutory payment stream with full coverage".to_string()
                },
            ),
            check(
                4,
                "Data Completeness",
                complete,
                3,
                if complete {
                    "All referenced counterparty banks supplied".to_string()
                } else {
                    format!("{} missing counterparty bank(s)", missing.occurrences.len())
                },
            ),
        ];

        let earned_points: u32 = checks.iter().map(|c| c.points).sum();
        let max_points: u32 = checks.iter().map(|c| c.max_points).sum();
        // Percentage-of-maximum formula; raw points are also reported.
        let score = round1(f64::from(earned_points) / f64::from(max_points) * 100.0);

        IntegrityScore { score, earned_points, max_points, checks }
    }
}

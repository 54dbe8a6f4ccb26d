//! Synthetic business generator
//!
//! Produces records with the same schema as real input so the pipeline can
//! run end to end without a data file.

use crate::encoding::{IndustrySector, RegionParish};
use crate::feature_extractor::{INDUSTRY_COLUMN, REGION_COLUMN};
use crate::types::record::{BusinessRecord, RecordBatch};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Risk profile a synthetic business is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Profile {
    Low,
    Medium,
    High,
}

/// Seeded generator of synthetic business records
pub struct BusinessGenerator {
    rng: StdRng,
    business_counter: u64,
}

impl BusinessGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            business_counter: 0,
        }
    }

    /// Generate `count` businesses as one batch
    pub fn generate_batch(&mut self, count: usize) -> RecordBatch {
        let records = (0..count).map(|_| self.generate()).collect();
        RecordBatch::from_records(records)
    }

    /// Generate a single business with a randomly chosen risk profile
    pub fn generate(&mut self) -> BusinessRecord {
        self.business_counter += 1;
        let id = self.business_counter;

        let profile = match self.rng.gen_range(0.0..1.0) {
            p if p < 0.4 => Profile::Low,
            p if p < 0.8 => Profile::Medium,
            _ => Profile::High,
        };

        let (base_revenue, credit_score, profit_margin, debt_ratio) = match profile {
            Profile::Low => (
                self.rng.gen_range(500_000.0..2_000_000.0),
                self.rng.gen_range(700..850),
                self.rng.gen_range(0.15..0.35),
                self.rng.gen_range(0.1..0.3),
            ),
            Profile::Medium => (
                self.rng.gen_range(200_000.0..800_000.0),
                self.rng.gen_range(600..720),
                self.rng.gen_range(0.05..0.18),
                self.rng.gen_range(0.25..0.5),
            ),
            Profile::High => (
                self.rng.gen_range(50_000.0..400_000.0),
                self.rng.gen_range(450..620),
                self.rng.gen_range(-0.1..0.1),
                self.rng.gen_range(0.4..0.8),
            ),
        };

        let sector = IndustrySector::ALL[self.rng.gen_range(0..IndustrySector::ALL.len())];
        let parish = RegionParish::ALL[self.rng.gen_range(0..RegionParish::ALL.len())];

        let mut record = BusinessRecord::new()
            .with("business_id", format!("BUS_{:04}", id))
            .with("business_name", format!("Sample Business {}", id))
            .with(INDUSTRY_COLUMN, sector.name())
            .with(REGION_COLUMN, parish.name());

        let mut put = |name: &str, value: f64| record.set(name, value.to_string());

        // Financial
        put("annual_revenue", base_revenue);
        put("revenue_growth_yoy", self.rng.gen_range(-0.2..0.3));
        put("revenue_volatility", self.rng.gen_range(0.05..0.25));
        put("profit_margin", profit_margin);
        put("gross_margin", profit_margin + self.rng.gen_range(0.1..0.2));
        put("operating_margin", profit_margin + self.rng.gen_range(0.02..0.08));

        // Cash
        put("avg_bank_balance", base_revenue * self.rng.gen_range(0.05..0.15));
        put("min_bank_balance_last_12m", base_revenue * self.rng.gen_range(0.01..0.05));
        put("bank_balance_volatility", self.rng.gen_range(0.1..0.4));
        put("cash_inflow_monthly_avg", base_revenue / 12.0 * self.rng.gen_range(0.8..1.2));
        put("cash_outflow_monthly_avg", base_revenue / 12.0 * self.rng.gen_range(0.7..1.1));
        put("cash_to_monthly_expense_ratio", self.rng.gen_range(0.5..3.0));
        put("net_cash_flow_trend", self.rng.gen_range(-0.1..0.2));

        // Debt
        put("total_debt", base_revenue * debt_ratio);
        put("debt_to_revenue", debt_ratio);
        put("debt_service_coverage_ratio", self.rng.gen_range(0.8..3.0));
        put("credit_utilization_ratio", self.rng.gen_range(0.1..0.9));
        put("loan_payment_to_revenue", self.rng.gen_range(0.02..0.15));

        // Workforce
        put("employee_count", self.rng.gen_range(2..50) as f64);
        put("payroll_to_revenue", self.rng.gen_range(0.2..0.5));
        put("avg_wage_per_employee", self.rng.gen_range(30_000.0..70_000.0));
        put("employee_growth_rate", self.rng.gen_range(-0.1..0.2));
        put("payroll_consistency_score", self.rng.gen_range(0.7..1.0));

        // Credit
        put("credit_score_business", credit_score as f64);
        put(
            "credit_score_owner",
            (credit_score + self.rng.gen_range(-50..50)) as f64,
        );
        put("years_in_business", self.rng.gen_range(1..25) as f64);
        put("days_past_due_max_last_12m", self.pick(&[0.0, 0.0, 0.0, 30.0, 60.0, 90.0]));
        put("num_late_payments_last_12m", self.pick(&[0.0, 0.0, 1.0, 2.0, 3.0, 5.0]));
        put("num_returned_payments_last_12m", self.pick(&[0.0, 0.0, 0.0, 1.0, 2.0]));
        put("has_tax_lien", self.pick(&[0.0, 0.0, 0.0, 0.0, 1.0]));
        put("bankruptcy_history", self.pick(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]));

        // Operational
        put("missed_payroll_count_last_12m", self.pick(&[0.0, 0.0, 0.0, 1.0, 2.0]));
        put("overdraft_count_last_12m", self.pick(&[0.0, 0.0, 1.0, 2.0, 3.0, 5.0]));
        put("overdraft_days_last_12m", self.pick(&[0.0, 0.0, 0.0, 5.0, 10.0, 20.0]));
        put("utilization_rate_card", self.rng.gen_range(0.1..0.9));

        // IGS benchmarks
        put("igs_sales_index", self.rng.gen_range(90.0..110.0));
        put("igs_employment_index", self.rng.gen_range(95.0..105.0));
        put("igs_small_business_index", self.rng.gen_range(92.0..108.0));

        record
    }

    fn pick(&mut self, choices: &[f64]) -> f64 {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

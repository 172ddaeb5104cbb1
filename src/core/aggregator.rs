use crate::core::deadline::is_expired;
use crate::core::normalize::normalize;
use crate::domain::model::{
    AggregateOutput, AggregationReport, Company, JobPosting, MatchedJob, PersonnelTotals,
};
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

/// Registry lookup keyed by normalized company name.
#[derive(Debug, Default)]
pub struct CompanyIndex<'a> {
    by_name: HashMap<String, &'a Company>,
    collisions: usize,
}

impl<'a> CompanyIndex<'a> {
    /// Later companies overwrite earlier ones with the same normalized name;
    /// each overwrite is counted in `collisions`.
    pub fn build(companies: &'a [Company]) -> Self {
        let mut by_name = HashMap::with_capacity(companies.len());
        let mut collisions = 0;
        for company in companies {
            if by_name.insert(normalize(&company.name), company).is_some() {
                collisions += 1;
            }
        }
        Self {
            by_name,
            collisions,
        }
    }

    pub fn lookup(&self, company_name: &str) -> Option<&'a Company> {
        self.by_name.get(&normalize(company_name)).copied()
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

/// Join live postings against the registry. Output keeps input order.
pub fn aggregate(
    companies: &[Company],
    job_lists: &[Vec<JobPosting>],
    now: DateTime<FixedOffset>,
) -> Vec<MatchedJob> {
    aggregate_with_report(companies, job_lists, now).matched_jobs
}

pub fn aggregate_with_report(
    companies: &[Company],
    job_lists: &[Vec<JobPosting>],
    now: DateTime<FixedOffset>,
) -> AggregateOutput {
    let index = CompanyIndex::build(companies);
    if index.collisions() > 0 {
        tracing::warn!(
            collisions = index.collisions(),
            "Registry contains companies with identical normalized names; later entries win"
        );
    }

    let mut report = AggregationReport {
        companies_loaded: companies.len(),
        name_collisions: index.collisions(),
        ..AggregationReport::default()
    };
    let mut matched_jobs = Vec::new();

    for job in job_lists.iter().flatten() {
        report.jobs_loaded += 1;

        if is_expired(&job.deadline, now) {
            report.expired_filtered += 1;
            continue;
        }

        match index.lookup(&job.company) {
            Some(company) => matched_jobs.push(MatchedJob::new(job.clone(), company.clone())),
            None => {
                tracing::trace!(company = %job.company, source = %job.source, "no registry match");
                report.unmatched += 1;
            }
        }
    }

    report.matched = matched_jobs.len();
    report.personnel =
        PersonnelTotals::from_companies(matched_jobs.iter().map(|m| &m.designated_company_info));
    report.matched_companies = {
        let mut names: Vec<&str> = matched_jobs
            .iter()
            .map(|m| m.designated_company_info.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    };

    AggregateOutput {
        matched_jobs,
        report,
    }
}

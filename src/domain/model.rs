use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Headcounts at or above this value mean "pooled / unspecified allocation".
pub const PERSONNEL_SENTINEL: u32 = 900;

/// One entry of the designated-company registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_personnel: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplementary_personnel: Option<u32>,
}

impl Company {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sector: String::new(),
            location: location.into(),
            phone: None,
            main_product: None,
            active_personnel: None,
            supplementary_personnel: None,
        }
    }
}

/// Origin site of a job posting. Each tag owns one `jobs_<tag>.json` input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSource {
    Saramin,
    Jobkorea,
    Jumpit,
    Wanted,
}

impl JobSource {
    pub const ALL: [JobSource; 4] = [
        JobSource::Saramin,
        JobSource::Jobkorea,
        JobSource::Jumpit,
        JobSource::Wanted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::Saramin => "saramin",
            JobSource::Jobkorea => "jobkorea",
            JobSource::Jumpit => "jumpit",
            JobSource::Wanted => "wanted",
        }
    }

    pub fn file_name(&self) -> String {
        format!("jobs_{}.json", self.as_str())
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        JobSource::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown job source '{}' (expected one of saramin, jobkorea, jumpit, wanted)",
                    s
                )
            })
    }
}

/// A posting as written by one of the per-site scrapers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub company: String,
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub sector: String,
    pub source: JobSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
}

/// A live posting whose company is in the registry.
///
/// `closed` is always `false`: expired postings are dropped before matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedJob {
    #[serde(flatten)]
    pub job: JobPosting,
    pub is_designated: bool,
    pub designated_company_info: Company,
    pub closed: bool,
}

impl MatchedJob {
    pub fn new(job: JobPosting, company: Company) -> Self {
        Self {
            job,
            is_designated: true,
            designated_company_info: company,
            closed: false,
        }
    }
}

/// Sum of allocated headcounts, ignoring sentinel values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelTotals {
    pub active: u64,
    pub supplementary: u64,
}

impl PersonnelTotals {
    /// Each company (by name) contributes once.
    pub fn from_companies<'a>(companies: impl IntoIterator<Item = &'a Company>) -> Self {
        let mut seen = HashSet::new();
        let mut totals = Self::default();
        for company in companies {
            if !seen.insert(company.name.as_str()) {
                continue;
            }
            totals.active += countable(company.active_personnel);
            totals.supplementary += countable(company.supplementary_personnel);
        }
        totals
    }
}

fn countable(headcount: Option<u32>) -> u64 {
    match headcount {
        Some(n) if n < PERSONNEL_SENTINEL => u64::from(n),
        _ => 0,
    }
}

/// Everything the aggregation step reads.
#[derive(Debug, Clone, Default)]
pub struct AggregateInput {
    pub companies: Vec<Company>,
    /// One list per source, in the configured source order.
    pub job_lists: Vec<Vec<JobPosting>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    pub companies_loaded: usize,
    pub name_collisions: usize,
    pub jobs_loaded: usize,
    pub expired_filtered: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub matched_companies: usize,
    pub personnel: PersonnelTotals,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateOutput {
    pub matched_jobs: Vec<MatchedJob>,
    pub report: AggregationReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staffed(name: &str, active: Option<u32>, supplementary: Option<u32>) -> Company {
        Company {
            active_personnel: active,
            supplementary_personnel: supplementary,
            ..Company::new(name, "서울")
        }
    }

    #[test]
    fn test_personnel_totals_skip_sentinel_and_duplicates() {
        let companies = vec![
            staffed("가나", Some(3), Some(2)),
            staffed("다라", Some(999), Some(1)),
            staffed("가나", Some(3), Some(2)),
            staffed("마바", None, Some(900)),
        ];

        let totals = PersonnelTotals::from_companies(&companies);

        assert_eq!(totals.active, 3);
        assert_eq!(totals.supplementary, 3);
    }

    #[test]
    fn test_matched_job_field_order() {
        let job = JobPosting {
            company: "테크코".to_string(),
            title: "백엔드 개발자".to_string(),
            link: "https://example.com/1".to_string(),
            deadline: "D-3".to_string(),
            sector: "IT".to_string(),
            source: JobSource::Wanted,
            salary: None,
        };
        let matched = MatchedJob::new(job, Company::new("(주)테크코", "서울"));

        let json = serde_json::to_string(&matched).unwrap();

        assert_eq!(
            json,
            r#"{"company":"테크코","title":"백엔드 개발자","link":"https://example.com/1","deadline":"D-3","sector":"IT","source":"wanted","isDesignated":true,"designatedCompanyInfo":{"name":"(주)테크코","sector":"","location":"서울"},"closed":false}"#
        );
    }

    #[test]
    fn test_company_reads_camel_case_and_missing_fields() {
        let company: Company = serde_json::from_str(
            r#"{"name":"㈜한빛","location":"경기","mainProduct":"반도체","activePersonnel":4}"#,
        )
        .unwrap();

        assert_eq!(company.sector, "");
        assert_eq!(company.main_product.as_deref(), Some("반도체"));
        assert_eq!(company.active_personnel, Some(4));
        assert_eq!(company.supplementary_personnel, None);
    }

    #[test]
    fn test_job_source_parsing() {
        assert_eq!("Saramin".parse::<JobSource>().unwrap(), JobSource::Saramin);
        assert_eq!(JobSource::Jobkorea.file_name(), "jobs_jobkorea.json");
        assert!("linkedin".parse::<JobSource>().is_err());
    }
}

//! Page source for the Military Manpower Administration registry of designated
//! companies. One list page yields up to `page_unit` rows; each row is enriched
//! from its detail page.

use crate::domain::model::Company;
use crate::domain::ports::PageSource;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SEARCH_URL: &str = "https://work.mma.go.kr/caisBYIS/search/byjjecgeomsaek.do";
pub const DEFAULT_DETAIL_URL: &str =
    "https://work.mma.go.kr/caisBYIS/search/byjjecgeomsaekView.do";
pub const DEFAULT_DETAIL_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";
/// 산업기능요원 (industrial technical personnel) program.
const PROGRAM_CODE: &str = "1";

static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.brd_list_n").expect("table selector is valid"));
static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.brd_list_n tbody tr").expect("row selector is valid"));
static NAME_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th a").expect("name selector is valid"));
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("cell selector is valid"));
static HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("header selector is valid"));

#[derive(Debug, Clone)]
pub struct MmaSourceConfig {
    pub search_url: String,
    pub detail_url: String,
    pub page_unit: u32,
    /// Detail pages fetched concurrently within one list page.
    pub detail_concurrency: usize,
    pub timeout: Duration,
}

impl Default for MmaSourceConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            detail_url: DEFAULT_DETAIL_URL.to_string(),
            page_unit: crate::core::scheduler::DEFAULT_PAGE_UNIT,
            detail_concurrency: DEFAULT_DETAIL_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// A list-page row before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRow {
    pub name: String,
    pub region: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDetail {
    pub sector: String,
    pub phone: Option<String>,
    pub main_product: Option<String>,
    pub active_personnel: u32,
    pub supplementary_personnel: u32,
}

impl RegistryRow {
    fn into_company(self, detail: Option<CompanyDetail>) -> Company {
        let mut company = Company::new(self.name, self.region);
        if let Some(detail) = detail {
            company.sector = detail.sector;
            company.phone = detail.phone;
            company.main_product = detail.main_product;
            company.active_personnel = Some(detail.active_personnel);
            company.supplementary_personnel = Some(detail.supplementary_personnel);
        }
        company
    }
}

pub struct MmaRegistrySource {
    client: Client,
    config: MmaSourceConfig,
}

impl MmaRegistrySource {
    pub fn new(config: MmaSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String> {
        let response = self.client.post(url).form(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    async fn fetch_detail(&self, row: &RegistryRow) -> Option<CompanyDetail> {
        let (company_code, program) = detail_params(&self.config.search_url, &row.link)?;

        let form = [
            ("byjjeopche_cd", company_code.as_str()),
            ("eopjong_gbcd", program.as_str()),
            ("menu_id", "m_m6"),
        ];
        match self.post_form(&self.config.detail_url, &form).await {
            Ok(html) => Some(parse_detail_page(&html)),
            Err(e) => {
                tracing::debug!(company = %row.name, "Detail fetch failed: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl PageSource for MmaRegistrySource {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Company>> {
        let page_unit = self.config.page_unit.to_string();
        let page_index = page.to_string();
        let form = [
            ("pageUnit", page_unit.as_str()),
            ("pageIndex", page_index.as_str()),
            ("eopjong_gbcd", PROGRAM_CODE),
            ("menu_id", "m_m6_1"),
        ];

        tracing::info!(page, unit = self.config.page_unit, "Fetching registry page");
        let html = self.post_form(&self.config.search_url, &form).await?;
        let rows = parse_list_page(&html).ok_or_else(|| EtlError::PageParseError {
            page,
            message: "result table not found".to_string(),
        })?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut companies = Vec::with_capacity(rows.len());
        for chunk in rows.chunks(self.config.detail_concurrency.max(1)) {
            let details = join_all(chunk.iter().map(|row| self.fetch_detail(row))).await;
            companies.extend(
                chunk
                    .iter()
                    .cloned()
                    .zip(details)
                    .map(|(row, detail)| row.into_company(detail)),
            );
        }

        tracing::info!(page, companies = companies.len(), "Registry page done");
        Ok(companies)
    }
}

/// Rows of the registry result table, or `None` when the page has no result
/// table at all. Rows missing either a company name or a detail link are skipped.
pub fn parse_list_page(html: &str) -> Option<Vec<RegistryRow>> {
    let document = Html::parse_document(html);
    document.select(&TABLE).next()?;
    let rows = document
        .select(&ROW)
        .filter_map(|row| {
            let anchor = row.select(&NAME_LINK).next()?;
            let name = element_text(&anchor);
            if name.is_empty() {
                return None;
            }
            // Columns: name (th), year, region, status
            let region = row
                .select(&CELL)
                .nth(1)
                .map(|cell| element_text(&cell))
                .unwrap_or_default();
            let link = anchor
                .value()
                .attr("href")
                .map(str::trim)
                .filter(|href| !href.is_empty())?
                .to_string();
            Some(RegistryRow { name, region, link })
        })
        .collect();
    Some(rows)
}

pub fn parse_detail_page(html: &str) -> CompanyDetail {
    let document = Html::parse_document(html);
    let field = |label: &str| value_after_header(&document, label);

    CompanyDetail {
        sector: field("업종").unwrap_or_default(),
        phone: field("전화번호").filter(|s| !s.is_empty()),
        main_product: field("주생산물").filter(|s| !s.is_empty()),
        active_personnel: headcount(field("현역배정인원").as_deref()),
        supplementary_personnel: headcount(field("보충역배정인원").as_deref()),
    }
}

/// Company code and program code carried in a row's detail link.
fn detail_params(base: &str, link: &str) -> Option<(String, String)> {
    let url = Url::parse(base).ok()?.join(link).ok()?;
    let mut company_code = None;
    let mut program = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "byjjeopche_cd" => company_code = Some(value.into_owned()),
            "eopjong_gbcd" => program = Some(value.into_owned()),
            _ => {}
        }
    }
    Some((company_code?, program.unwrap_or_else(|| PROGRAM_CODE.to_string())))
}

/// Text of the `td` immediately following the first `th` whose text contains `label`.
fn value_after_header(document: &Html, label: &str) -> Option<String> {
    let header = document
        .select(&HEADER)
        .find(|th| element_text(th).contains(label))?;
    let next = header.next_siblings().find_map(ElementRef::wrap)?;
    (next.value().name() == "td").then(|| element_text(&next))
}

fn headcount(text: Option<&str>) -> u32 {
    text.map(|t| t.chars().filter(char::is_ascii_digit).collect::<String>())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{NotegraphError, Result};

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub vault: VaultConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

/// Where person and project documents live inside a vault.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub person_dir: String,
    pub project_dirs: Vec<ProjectDirConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDirConfig {
    pub path: String,
    #[serde(default)]
    pub archived: bool,
}

/// Static tables injected into the extractors and the assembler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub topic_categories: Vec<KeywordCategory>,
    /// Affiliations that name a relationship rather than an organization.
    pub excluded_affiliations: Vec<String>,
    /// Regex patterns removed from affiliations found in a document body.
    pub affiliation_cleanup_patterns: Vec<String>,
    /// Legal-entity tokens stripped when normalizing organization names.
    pub org_boilerplate: Vec<String>,
    /// Role suffixes split off the filename affiliation part.
    pub position_suffixes: Vec<String>,
    /// Role suffixes split off a header title.
    pub title_position_suffixes: Vec<String>,
    /// Regex patterns removed from a header title before it becomes a name.
    pub title_noise_patterns: Vec<String>,
    /// Separators joining several names in one title; only the first name is kept.
    pub name_separators: Vec<String>,
    pub email_domains: Vec<EmailDomainMapping>,
    pub personal_email_domains: Vec<String>,
    /// Maximum length, in grapheme clusters, of a meeting excerpt.
    pub excerpt_chars: usize,
    /// Language tag attached to free-text literals.
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailDomainMapping {
    pub domain: String,
    pub organization: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Cells longer than this are truncated in table output.
    pub max_cell_width: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            person_dir: "04_Networking/00_인물사전".to_string(),
            project_dirs: vec![
                ProjectDirConfig {
                    path: "00_A_Projects/Active".to_string(),
                    archived: false,
                },
                ProjectDirConfig {
                    path: "00_A_Projects/Planning".to_string(),
                    archived: false,
                },
                ProjectDirConfig {
                    path: "90_Archives".to_string(),
                    archived: true,
                },
            ],
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let category = |name: &str, keywords: &[&str]| KeywordCategory {
            name: name.to_string(),
            keywords: strings(keywords),
        };
        let domain = |domain: &str, organization: &str| EmailDomainMapping {
            domain: domain.to_string(),
            organization: organization.to_string(),
        };

        Self {
            topic_categories: vec![
                category("investment", &["투자", "펀딩", "시리즈"]),
                category("startup", &["창업", "스타트업", "사업"]),
                category("hiring", &["채용", "이직", "면접"]),
                category("tech", &["기술", "개발", "AI", "ML"]),
                category("networking", &["네트워킹", "커피챗", "미팅"]),
            ],
            excluded_affiliations: strings(&[
                "가족",
                "간병",
                "본인",
                "기타",
                "개인셀러",
                "ASC강사",
                "못디동기",
                "친구",
                "지인",
                "교회",
            ]),
            affiliation_cleanup_patterns: strings(&[r"독일\s+", r"한국지사", r"\s+한국$"]),
            org_boilerplate: strings(&[
                "(주)",
                "㈜",
                "주식회사",
                "(유)",
                "유한회사",
                "co., ltd.",
                "co.,ltd.",
                "co. ltd.",
                "ltd.",
                "ltd",
                "inc.",
                "inc",
                "corp.",
                "corp",
                "llc",
                "gmbh",
            ]),
            position_suffixes: strings(&[
                "팀장", "상무", "이사", "부장", "과장", "대리", "사원", "대표", "매니저", "리더",
                "센터장", "본부장", "실장", "책임",
            ]),
            title_position_suffixes: strings(&[
                "교수", "센터장", "본부장", "실장", "국장", "팀장", "부장", "과장",
            ]),
            title_noise_patterns: strings(&[
                r"님과\s*(링크드인\s*)?(대화|통화|미팅)",
                r"\s*\([^)]*\)",
            ]),
            name_separators: strings(&[" / ", " & ", " and ", " 및 ", ", "]),
            email_domains: vec![
                domain("kefico.co.kr", "현대케피코"),
                domain("hyundai-kefico.com", "현대케피코"),
                domain("hyundai.com", "현대자동차"),
                domain("hmg.com", "현대자동차그룹"),
                domain("kia.com", "기아"),
                domain("lgchem.com", "LG화학"),
                domain("lges.com", "LG에너지솔루션"),
                domain("samsung.com", "삼성"),
                domain("samsungsdi.com", "삼성SDI"),
                domain("nuvi-labs.com", "누비랩"),
                domain("nuvilab.com", "누비랩"),
                domain("antler.co", "앤틀러코리아"),
                domain("maum.ai", "마음AI"),
                domain("angelswing.io", "엔젤스윙"),
                domain("fescaro.com", "페스카로"),
                domain("signetev.com", "시그넷EV"),
                domain("catholic.ac.kr", "가톨릭대학교"),
            ],
            personal_email_domains: strings(&[
                "gmail.com",
                "naver.com",
                "hanmail.net",
                "daum.net",
                "kakao.com",
                "nate.com",
                "hotmail.com",
                "outlook.com",
                "yahoo.com",
                "icloud.com",
                "me.com",
                "live.com",
            ]),
            excerpt_chars: 500,
            language: "ko".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { max_cell_width: 80 }
    }
}

impl Config {
    /// Built-in defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Load a configuration file (TOML, YAML or JSON, chosen by extension)
    /// and apply environment overrides on top of it.
    ///
    /// Without an explicit path, `NOTEGRAPH_CONFIG` is consulted; without
    /// either, this is equivalent to [`Config::from_env`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env::var("NOTEGRAPH_CONFIG").ok().map(PathBuf::from));

        let config = match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(NotegraphError::InvalidPath(path));
                }
                tracing::debug!(path = %path.display(), "Loading configuration file");
                let mut config = config::Config::builder()
                    .add_source(config::File::from(path.as_path()))
                    .build()?
                    .try_deserialize::<Config>()?;
                config.apply_env_overrides();
                config
            }
            None => Self::from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("NOTEGRAPH_PERSON_DIR") {
            self.vault.person_dir = dir;
        }
        self.extraction.excerpt_chars =
            parse_env_or("NOTEGRAPH_EXCERPT_CHARS", self.extraction.excerpt_chars);
        if let Ok(language) = env::var("NOTEGRAPH_LANGUAGE") {
            self.extraction.language = language;
        }
        self.output.max_cell_width =
            parse_env_or("NOTEGRAPH_MAX_CELL_WIDTH", self.output.max_cell_width);
    }

    fn validate(&self) -> Result<()> {
        if self.extraction.excerpt_chars == 0 {
            return Err(NotegraphError::Validation(
                "extraction.excerpt_chars must be greater than zero".to_string(),
            ));
        }
        if self.output.max_cell_width < 4 {
            return Err(NotegraphError::Validation(
                "output.max_cell_width must be at least 4".to_string(),
            ));
        }
        if self
            .extraction
            .language
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '-'))
        {
            return Err(NotegraphError::Validation(format!(
                "extraction.language '{}' is not a valid language tag",
                self.extraction.language
            )));
        }
        Ok(())
    }
}

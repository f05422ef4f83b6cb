// src/services/mp_client.rs

//! Page fetcher for the official-account admin API.
//!
//! An account nickname is first resolved to its `fakeid` through
//! `cgi-bin/searchbiz`; article pages then come from
//! `cgi-bin/appmsg?action=list_ex`. Both calls need a logged-in cookie and
//! the matching token, which are taken from configuration as-is.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{COOKIE, REFERER};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ApiConfig, RawItem};
use crate::services::PageFetcher;

#[derive(Debug, Deserialize)]
struct BaseResp {
    ret: i64,
    #[serde(default)]
    err_msg: String,
}

#[derive(Debug, Deserialize)]
struct SearchBizResponse {
    base_resp: BaseResp,
    #[serde(default)]
    list: Vec<BizEntry>,
}

#[derive(Debug, Deserialize)]
struct BizEntry {
    fakeid: String,
    #[serde(default)]
    nickname: String,
}

#[derive(Debug, Deserialize)]
struct AppMsgResponse {
    base_resp: BaseResp,
    #[serde(default)]
    app_msg_list: Vec<RawItem>,
}

fn check_base_resp(context: &str, base: &BaseResp) -> Result<()> {
    if base.ret == 0 {
        Ok(())
    } else {
        Err(AppError::upstream(
            context,
            format!("ret={} {}", base.ret, base.err_msg),
        ))
    }
}

/// Pick the account whose nickname matches exactly, else the first hit.
fn choose_fakeid(nickname: &str, entries: &[BizEntry]) -> Option<String> {
    entries
        .iter()
        .find(|e| e.nickname == nickname)
        .or_else(|| entries.first())
        .map(|e| e.fakeid.clone())
}

/// HTTP page fetcher backed by the admin API.
pub struct MpPageFetcher {
    client: Client,
    api: ApiConfig,
    fakeids: Mutex<HashMap<String, String>>,
}

impl MpPageFetcher {
    pub fn new(client: Client, api: ApiConfig) -> Self {
        Self {
            client,
            api,
            fakeids: Mutex::new(HashMap::new()),
        }
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let base = format!("{}/{}", self.api.base_url.trim_end_matches('/'), path);
        let mut url = Url::parse_with_params(&base, params)?;
        url.query_pairs_mut()
            .append_pair("token", &self.api.token)
            .append_pair("lang", "zh_CN")
            .append_pair("f", "json")
            .append_pair("ajax", "1");
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let referer = format!("{}/", self.api.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .header(COOKIE, &self.api.cookie)
            .header(REFERER, referer)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    fn cached_fakeid(&self, nickname: &str) -> Option<String> {
        self.fakeids
            .lock()
            .ok()
            .and_then(|cache| cache.get(nickname).cloned())
    }

    async fn resolve_fakeid(&self, nickname: &str) -> Result<String> {
        if let Some(fakeid) = self.cached_fakeid(nickname) {
            return Ok(fakeid);
        }

        let url = self.endpoint(
            "cgi-bin/searchbiz",
            &[
                ("action", "search_biz"),
                ("begin", "0"),
                ("count", "5"),
                ("query", nickname),
            ],
        )?;
        let response: SearchBizResponse = self.get_json(url).await?;
        check_base_resp(nickname, &response.base_resp)?;

        let fakeid = choose_fakeid(nickname, &response.list)
            .ok_or_else(|| AppError::upstream(nickname, "account not found"))?;
        log::debug!("Resolved account '{}' to fakeid {}", nickname, fakeid);

        if let Ok(mut cache) = self.fakeids.lock() {
            cache.insert(nickname.to_string(), fakeid.clone());
        }
        Ok(fakeid)
    }
}

#[async_trait]
impl PageFetcher for MpPageFetcher {
    fn is_ready(&self) -> bool {
        self.api.has_credentials()
    }

    async fn fetch_page(&self, source: &str, offset: usize, count: usize) -> Result<Vec<RawItem>> {
        if !self.is_ready() {
            return Err(AppError::not_ready("API cookie/token are not configured"));
        }

        let fakeid = self.resolve_fakeid(source).await?;
        let begin = offset.to_string();
        let count = count.to_string();
        let url = self.endpoint(
            "cgi-bin/appmsg",
            &[
                ("action", "list_ex"),
                ("begin", &begin),
                ("count", &count),
                ("fakeid", &fakeid),
                ("type", "9"),
                ("query", ""),
            ],
        )?;

        let response: AppMsgResponse = self.get_json(url).await?;
        check_base_resp(source, &response.base_resp)?;
        Ok(response.app_msg_list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(api: ApiConfig) -> MpPageFetcher {
        MpPageFetcher::new(Client::new(), api)
    }

    #[test]
    fn test_not_ready_without_credentials() {
        assert!(!fetcher(ApiConfig::default()).is_ready());
    }

    #[tokio::test]
    async fn test_fetch_refuses_without_credentials() {
        let result = fetcher(ApiConfig::default()).fetch_page("acct", 0, 5).await;
        assert!(matches!(result, Err(AppError::NotReady(_))));
    }

    #[test]
    fn test_endpoint_carries_token() {
        let api = ApiConfig {
            base_url: "https://mp.example.com/".into(),
            cookie: "k=v".into(),
            token: "42".into(),
        };
        let url = fetcher(api)
            .endpoint("cgi-bin/appmsg", &[("begin", "10"), ("count", "5")])
            .unwrap();
        assert_eq!(url.path(), "/cgi-bin/appmsg");
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["begin"], "10");
        assert_eq!(pairs["token"], "42");
        assert_eq!(pairs["f"], "json");
    }

    #[test]
    fn test_appmsg_response_parsing() {
        let json = r#"{
            "base_resp": {"ret": 0, "err_msg": "ok"},
            "app_msg_list": [
                {"title": "First", "link": "https://mp.example.com/s/1", "create_time": 1},
                {"link": "https://mp.example.com/s/2"}
            ],
            "app_msg_cnt": 2
        }"#;
        let response: AppMsgResponse = serde_json::from_str(json).unwrap();
        assert!(check_base_resp("acct", &response.base_resp).is_ok());
        assert_eq!(response.app_msg_list.len(), 2);
        assert_eq!(response.app_msg_list[1].title(), crate::models::UNTITLED);
    }

    #[test]
    fn test_backend_error_code() {
        let json = r#"{"base_resp": {"ret": 200013, "err_msg": "freq control"}}"#;
        let response: AppMsgResponse = serde_json::from_str(json).unwrap();
        let err = check_base_resp("acct", &response.base_resp).unwrap_err();
        assert!(err.to_string().contains("200013"));
        assert!(response.app_msg_list.is_empty());
    }

    #[test]
    fn test_choose_fakeid_prefers_exact_nickname() {
        let entries = vec![
            BizEntry {
                fakeid: "A".into(),
                nickname: "Tech Weekly Digest".into(),
            },
            BizEntry {
                fakeid: "B".into(),
                nickname: "Tech Weekly".into(),
            },
        ];
        assert_eq!(choose_fakeid("Tech Weekly", &entries), Some("B".into()));
        assert_eq!(choose_fakeid("Other", &entries), Some("A".into()));
        assert_eq!(choose_fakeid("Other", &[]), None);
    }
}

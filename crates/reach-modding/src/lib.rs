use std::marker::PhantomData;

use anyhow::anyhow;
use reqwest::Client;
use serde::de::DeserializeOwned;

mod queries;
pub use queries::*;

/// Base url of the CRMM api.
pub const CRMM_API: &str = "https://api.crmm.tech/api";

pub struct Query<Data, T>
where
    Data: QueryData<T>,
{
    data: Data,
    _marker: PhantomData<T>,
}

impl<Data, T> Query<Data, T>
where
    Data: QueryData<T>,
    T: DeserializeOwned,
{
    pub fn new(data: Data) -> Self {
        Self {
            data,
            _marker: PhantomData,
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        self.data.builder(base_url).build()
    }

    pub async fn query_with(&self, client: &Client, base_url: &str) -> anyhow::Result<T> {
        let s = client
            .get(self.url(base_url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_json(&s)
    }
}

/// Deserialize `s` reporting the path of the field that failed.
pub fn parse_json<T: DeserializeOwned>(s: &str) -> anyhow::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(s);

    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        anyhow!(
            "Path: {}. Error: {}",
            e.path().clone().to_string(),
            e.into_inner().to_string()
        )
    })
}

pub trait QueryData<T> {
    /// Build the url.
    fn builder(&self, base_url: &str) -> Builder;
}

pub struct Builder {
    base_url: String,
    data: Vec<String>,
}

impl Builder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            data: Vec::new(),
        }
    }

    fn check_and_add_symbol(&mut self) {
        if self.data.is_empty() {
            self.data.push("?".to_owned());
        } else {
            self.data.push("&".to_owned());
        }
    }

    pub fn add_optional_parameter(
        mut self,
        name: impl Into<String>,
        param: Option<impl Into<String>>,
    ) -> Self {
        if let Some(param) = param.map(Into::into) {
            self.check_and_add_symbol();
            self.data.push(format!("{}={}", name.into(), param));
        }
        self
    }

    pub fn add_parameter(mut self, name: impl Into<String>, param: impl Into<String>) -> Self {
        self.check_and_add_symbol();
        self.data.push(format!("{}={}", name.into(), param.into()));
        self
    }

    pub fn build(&self) -> String {
        format!("{}{}", self.base_url, self.data.join(""))
    }
}

pub(crate) fn format_list(value: impl Iterator<Item = impl Into<String>>) -> String {
    let iter = value.map(|s| format!("\"{}\"", s.into()));
    let s = itertools::intersperse(iter, ",".to_owned()).collect::<String>();
    format!("[{s}]")
}

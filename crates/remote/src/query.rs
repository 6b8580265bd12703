//! Filters of the table query surface, rendered as `column=op.value` pairs.

use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(self, columns: &str) -> Self {
        self.push("select", columns.to_string())
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("eq.{value}"))
    }

    pub fn is_null(self, column: &str) -> Self {
        self.push(column, "is.null".to_string())
    }

    pub fn gte(self, column: &str, at: DateTime<Utc>) -> Self {
        self.push(column, format!("gte.{}", timestamp(at)))
    }

    pub fn lt(self, column: &str, at: DateTime<Utc>) -> Self {
        self.push(column, format!("lt.{}", timestamp(at)))
    }

    /// Substring match. `*` is the wildcard of the query surface.
    pub fn contains(self, column: &str, needle: &str) -> Self {
        self.push(column, format!("like.*{needle}*"))
    }

    pub fn order(self, column: &str, order: Order) -> Self {
        let direction = match order {
            Order::Asc => "asc",
            Order::Desc => "desc",
        };
        self.push("order", format!("{column}.{direction}"))
    }

    pub fn limit(self, limit: u32) -> Self {
        self.push("limit", limit.to_string())
    }

    pub fn offset(self, offset: u32) -> Self {
        self.push("offset", offset.to_string())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }

    /// Appends the filters to `url`.
    pub fn apply(&self, url: &mut Url) {
        if self.params.is_empty() {
            return;
        }
        url.query_pairs_mut().extend_pairs(&self.params);
    }

    fn push(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn render(query: &Query) -> String {
        let mut url = Url::parse("https://store.example/rest/v1/operaciones_cajas").unwrap();
        query.apply(&mut url);
        url.to_string()
    }

    #[test]
    fn equality_order_and_limit() {
        let query = Query::new()
            .eq("tipo_servicio", "CELULAR")
            .order("created_at", Order::Desc)
            .limit(1);
        assert_eq!(
            render(&query),
            "https://store.example/rest/v1/operaciones_cajas?tipo_servicio=eq.CELULAR&order=created_at.desc&limit=1"
        );
    }

    #[test]
    fn range_is_half_open() {
        let from = Utc.with_ymd_and_hms(2026, 9, 1, 5, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2026, 10, 1, 5, 0, 0).unwrap();
        let query = Query::new().gte("fecha", from).lt("fecha", until);
        assert_eq!(
            query.pairs(),
            &[
                ("fecha".to_string(), "gte.2026-09-01T05:00:00Z".to_string()),
                ("fecha".to_string(), "lt.2026-10-01T05:00:00Z".to_string()),
            ]
        );
    }

    #[test]
    fn substring_and_paging() {
        let query = Query::new()
            .contains("descripcion", "2026-09")
            .is_null("hora_fecha_cierre")
            .offset(20)
            .limit(10);
        let rendered = render(&query);
        assert!(rendered.contains("descripcion=like.*2026-09*"));
        assert!(rendered.contains("hora_fecha_cierre=is.null"));
        assert!(rendered.ends_with("offset=20&limit=10"));
    }

    #[test]
    fn empty_query_leaves_url_untouched() {
        assert_eq!(
            render(&Query::new()),
            "https://store.example/rest/v1/operaciones_cajas"
        );
    }
}

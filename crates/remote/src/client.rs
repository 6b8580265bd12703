use std::time::Duration;

use api_types::{
    closing::DailyClosingRow,
    employee::Employee,
    operation::{OperationFilter, OperationRow},
    rpc::{Procedure, RpcResponse},
    service::ServiceKind,
    settings::ConfigRow,
    shift::{ShiftNew, ShiftRow},
    snapshot::VirtualSnapshotRow,
    till::TillRow,
    topup::{TopUpFilter, TopUpRow},
};
use chrono::{DateTime, NaiveDate, Utc};
use engine::{Backend, BackendError, BackendResult};
use reqwest::{
    Client, RequestBuilder, StatusCode, Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    query::{Order, Query},
    rows::{
        self, ClosingRecord, ConfigRecord, EmployeeRecord, OperationRecord, SessionUser,
        ShiftClose, ShiftInsert, ShiftRecord, SnapshotRecord, TillRecord, TopUpRecord,
    },
};

/// Errors building an [`HttpBackend`].
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("missing setting: {0}")]
    MissingSetting(&'static str),
    #[error("invalid base_url: {0}")]
    InvalidUrl(String),
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error", alias = "msg")]
    message: String,
}

/// [`Backend`] over the store's HTTP surface: `rest/v1/<table>` for queries,
/// `rest/v1/rpc/<name>` for procedures and `auth/v1/user` for the session.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    http: Client,
    base_url: Url,
    has_session: bool,
}

impl HttpBackend {
    /// Return a builder for `HttpBackend`.
    pub fn builder() -> HttpBackendBuilder {
        HttpBackendBuilder::default()
    }

    fn url(&self, path: &str) -> BackendResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| BackendError::Unavailable(format!("invalid path {path}: {err}")))
    }

    fn table_url(&self, table: &str, query: &Query) -> BackendResult<Url> {
        let mut url = self.url(&format!("rest/v1/{table}"))?;
        query.apply(&mut url);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> BackendResult<T> {
        let resp = request.send().await.map_err(transport)?;
        let status = resp.status();
        if status.is_success() {
            return resp.json::<T>().await.map_err(transport);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("server error")
                .to_string(),
        };
        Err(BackendError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn select<R: DeserializeOwned>(&self, table: &str, query: Query) -> BackendResult<Vec<R>> {
        let url = self.table_url(table, &query)?;
        tracing::debug!(%table, "select");
        self.send(self.http.get(url)).await
    }

    async fn select_one<R: DeserializeOwned>(&self, table: &str, query: Query) -> BackendResult<Option<R>> {
        let rows: Vec<R> = self.select(table, query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert<B: Serialize, R: DeserializeOwned>(&self, table: &str, body: &B) -> BackendResult<Vec<R>> {
        let url = self.table_url(table, &Query::new())?;
        tracing::debug!(%table, "insert");
        self.send(
            self.http
                .post(url)
                .header("Prefer", "return=representation")
                .json(body),
        )
        .await
    }

    async fn update<B: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        query: Query,
        body: &B,
    ) -> BackendResult<Vec<R>> {
        let url = self.table_url(table, &query)?;
        tracing::debug!(%table, "update");
        self.send(
            self.http
                .patch(url)
                .header("Prefer", "return=representation")
                .json(body),
        )
        .await
    }
}

fn transport(err: reqwest::Error) -> BackendError {
    if err.is_decode() {
        BackendError::Decode(err.to_string())
    } else {
        BackendError::Unavailable(err.to_string())
    }
}

fn convert<R, T>(records: Vec<R>) -> BackendResult<Vec<T>>
where
    T: TryFrom<R, Error = BackendError>,
{
    records.into_iter().map(T::try_from).collect()
}

impl Backend for HttpBackend {
    async fn current_employee(&self) -> BackendResult<Option<Employee>> {
        if !self.has_session {
            return Ok(None);
        }
        let url = self.url("auth/v1/user")?;
        let user: SessionUser = match self.send(self.http.get(url)).await {
            Ok(user) => user,
            Err(BackendError::Server { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let record: Option<EmployeeRecord> = self
            .select_one(
                rows::EMPLOYEES,
                Query::new().select("id,nombre").eq("usuario_id", user.id),
            )
            .await?;
        Ok(record.map(Employee::from))
    }

    async fn tills(&self) -> BackendResult<Vec<TillRow>> {
        let records: Vec<TillRecord> = self
            .select(rows::TILLS, Query::new().order("id", Order::Asc))
            .await?;
        convert(records)
    }

    async fn config(&self) -> BackendResult<ConfigRow> {
        let record: Option<ConfigRecord> = self.select_one(rows::CONFIG, Query::new()).await?;
        record
            .ok_or_else(|| BackendError::Decode("no configuration row".to_string()))?
            .try_into()
    }

    async fn latest_snapshot(&self, service: ServiceKind) -> BackendResult<Option<VirtualSnapshotRow>> {
        let record: Option<SnapshotRecord> = self
            .select_one(
                rows::SNAPSHOTS,
                Query::new()
                    .eq("tipo_servicio", service)
                    .order("created_at", Order::Desc),
            )
            .await?;
        record.map(VirtualSnapshotRow::try_from).transpose()
    }

    async fn latest_closing(&self) -> BackendResult<Option<DailyClosingRow>> {
        let record: Option<ClosingRecord> = self
            .select_one(rows::CLOSINGS, Query::new().order("created_at", Order::Desc))
            .await?;
        record.map(DailyClosingRow::try_from).transpose()
    }

    async fn closing_for_shift(&self, shift_id: Uuid) -> BackendResult<Option<DailyClosingRow>> {
        let record: Option<ClosingRecord> = self
            .select_one(rows::CLOSINGS, Query::new().eq("turno_id", shift_id))
            .await?;
        record.map(DailyClosingRow::try_from).transpose()
    }

    async fn shifts_on(&self, date: NaiveDate) -> BackendResult<Vec<ShiftRow>> {
        let records: Vec<ShiftRecord> = self
            .select(
                rows::SHIFTS,
                Query::new()
                    .eq("fecha", date)
                    .order("numero_turno", Order::Asc),
            )
            .await?;
        Ok(records.into_iter().map(ShiftRow::from).collect())
    }

    async fn insert_shift(&self, shift: ShiftNew) -> BackendResult<ShiftRow> {
        let records: Vec<ShiftRecord> = self
            .insert(rows::SHIFTS, &ShiftInsert::from(shift))
            .await?;
        records
            .into_iter()
            .next()
            .map(ShiftRow::from)
            .ok_or_else(|| BackendError::Decode("insert returned no row".to_string()))
    }

    async fn close_shift(&self, shift_id: Uuid, closed_at: DateTime<Utc>) -> BackendResult<Option<ShiftRow>> {
        let records: Vec<ShiftRecord> = self
            .update(
                rows::SHIFTS,
                Query::new().eq("id", shift_id).is_null("hora_fecha_cierre"),
                &ShiftClose {
                    hora_fecha_cierre: closed_at,
                },
            )
            .await?;
        Ok(records.into_iter().next().map(ShiftRow::from))
    }

    async fn operations(&self, filter: &OperationFilter) -> BackendResult<Vec<OperationRow>> {
        let mut query = Query::new();
        if let Some(till) = filter.till {
            query = query.eq("codigo_caja", till);
        }
        if let Some(kind) = filter.kind {
            query = query.eq("tipo_operacion", kind.as_str());
        }
        if let Some(from) = filter.from {
            query = query.gte("fecha", from);
        }
        if let Some(until) = filter.until {
            query = query.lt("fecha", until);
        }
        if let Some(needle) = &filter.description_contains {
            query = query.contains("descripcion", needle);
        }
        let records: Vec<OperationRecord> = self
            .select(rows::OPERATIONS, query.order("fecha", Order::Asc))
            .await?;
        convert(records)
    }

    async fn topups(&self, filter: &TopUpFilter) -> BackendResult<Vec<TopUpRow>> {
        let mut query = Query::new();
        if let Some(service) = filter.service {
            query = query.eq("tipo_servicio", service);
        }
        if let Some(paid) = filter.paid {
            query = query.eq("pagado", paid);
        }
        let records: Vec<TopUpRecord> = self
            .select(rows::TOPUPS, query.order("fecha", Order::Asc))
            .await?;
        convert(records)
    }

    async fn call<P: Procedure>(&self, params: &P) -> BackendResult<RpcResponse<P::Output>> {
        let url = self.url(&format!("rest/v1/rpc/{}", P::NAME))?;
        tracing::debug!(procedure = P::NAME, "rpc");
        self.send(self.http.post(url).json(params)).await
    }
}

/// The builder for [`HttpBackend`].
#[derive(Default)]
pub struct HttpBackendBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    access_token: Option<String>,
    timeout: Option<Duration>,
}

impl HttpBackendBuilder {
    /// Root of the store, e.g. `https://store.example`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Project key sent as the `apikey` header on every request.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Session token. Without one no employee can be resolved.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into()).filter(|token: &String| !token.is_empty());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HttpBackend, RemoteError> {
        let base_url = self
            .base_url
            .ok_or(RemoteError::MissingSetting("base_url"))?;
        // `join` drops the last segment unless the base ends with a slash.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|err| RemoteError::InvalidUrl(err.to_string()))?;
        let api_key = self.api_key.ok_or(RemoteError::MissingSetting("api_key"))?;

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&api_key).map_err(|_| RemoteError::InvalidHeader("apikey"))?;
        key.set_sensitive(true);
        headers.insert("apikey", key);
        let bearer = self.access_token.as_deref().unwrap_or(&api_key);
        let mut auth = HeaderValue::from_str(&format!("Bearer {bearer}"))
            .map_err(|_| RemoteError::InvalidHeader("authorization"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let mut http = Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        Ok(HttpBackend {
            http: http.build()?,
            base_url,
            has_session: self.access_token.is_some(),
        })
    }
}

//! Service-level tests against a scripted in-memory provider.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use weather_core::{
    DayAggregate, ProviderError, Reading, WeatherError, WeatherProvider,
    model::CityLocation,
    provider::{ApiStatus, CityLookup, ForecastPayload, HistoricalPayload, HourlyRecord, NowPayload},
    service,
};

#[derive(Debug, Default)]
struct FakeProvider {
    lookup: CityLookup,
    now: NowPayload,
    forecast: ForecastPayload,
    /// Missing dates answer with an unreadable body.
    history: HashMap<String, HistoricalPayload>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn with_city(id: &str) -> Self {
        Self {
            lookup: CityLookup {
                status: ApiStatus::success(),
                location: Some(vec![location(id), location("999")]),
            },
            ..Self::default()
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn lookup_city(&self, query: &str) -> Result<CityLookup, ProviderError> {
        self.record(format!("lookup:{query}"));
        Ok(self.lookup.clone())
    }

    async fn current(&self, location_id: &str) -> Result<NowPayload, ProviderError> {
        self.record(format!("now:{location_id}"));
        Ok(self.now.clone())
    }

    async fn forecast(&self, location_id: &str) -> Result<ForecastPayload, ProviderError> {
        self.record(format!("7d:{location_id}"));
        Ok(self.forecast.clone())
    }

    async fn historical(
        &self,
        location_id: &str,
        date: &str,
    ) -> Result<HistoricalPayload, ProviderError> {
        self.record(format!("history:{location_id}:{date}"));
        self.history.get(date).cloned().ok_or_else(|| ProviderError::InvalidBody {
            endpoint: "historical weather",
            status: 502,
            reason: "expected value at line 1 column 1".into(),
            body: "<html>Bad Gateway</html>".into(),
        })
    }
}

fn location(id: &str) -> CityLocation {
    serde_json::from_value(json!({ "id": id, "name": "北京" })).unwrap()
}

fn hourly_day(temps: &[&str], text: &str) -> HistoricalPayload {
    HistoricalPayload {
        status: ApiStatus::success(),
        weather_hourly: Some(
            temps
                .iter()
                .map(|t| HourlyRecord { temp: Some(json!(t)), text: Some(text.into()) })
                .collect(),
        ),
        daily: None,
    }
}

#[tokio::test]
async fn resolve_location_returns_first_hit() {
    let provider = FakeProvider::with_city("101010100");

    let id = service::resolve_location(&provider, "北京").await.unwrap();
    assert_eq!(id, "101010100");
}

#[tokio::test]
async fn resolve_location_fails_on_empty_list() {
    let provider = FakeProvider {
        lookup: CityLookup { status: ApiStatus::success(), location: Some(vec![]) },
        ..FakeProvider::default()
    };

    let err = service::resolve_location(&provider, "Atlantis").await.unwrap_err();
    assert!(matches!(err, WeatherError::CityNotFound { ref query, ref code } if query == "Atlantis" && code == "200"));
}

#[tokio::test]
async fn resolve_location_fails_on_error_status_even_with_hits() {
    let provider = FakeProvider {
        lookup: CityLookup {
            status: ApiStatus::failure("401", Some("unauthorized")),
            location: Some(vec![location("1")]),
        },
        ..FakeProvider::default()
    };

    let err = service::resolve_location(&provider, "北京").await.unwrap_err();
    assert!(matches!(err, WeatherError::CityNotFound { ref code, .. } if code == "401"));
}

#[tokio::test]
async fn history_returns_one_record_per_day_in_order_despite_failures() {
    let mut provider = FakeProvider::with_city("42");
    // reference day is 2024-03-05; requested days are 04, 03, 02, 01
    provider.history.insert("20240304".into(), hourly_day(&["1", "9"], "晴"));
    provider.history.insert(
        "20240302".into(),
        HistoricalPayload { status: ApiStatus::failure("404", None), ..HistoricalPayload::default() },
    );
    provider.history.insert("20240301".into(), hourly_day(&["-3", "2"], "雪"));

    let now = Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap();
    let days = service::historical_weather(&provider, "北京", &now, 4).await.unwrap();

    let dates: Vec<&str> = days.iter().map(|d| d.date.as_str()).collect();
    assert_eq!(dates, ["20240304", "20240303", "20240302", "20240301"]);

    assert_eq!(days[0].max_temperature, Reading::measured(9.0));
    assert_eq!(days[1], DayAggregate::unknown("20240303"));
    assert_eq!(days[2], DayAggregate::unknown("20240302"));
    assert_eq!(days[3].min_temperature, Reading::measured(-3.0));
    assert_eq!(days[3].dominant_condition, Reading::Known("雪".to_string()));

    assert_eq!(
        provider.calls(),
        [
            "lookup:北京",
            "history:42:20240304",
            "history:42:20240303",
            "history:42:20240302",
            "history:42:20240301",
        ]
    );
}

#[tokio::test]
async fn history_aborts_when_city_is_unknown() {
    let provider = FakeProvider {
        lookup: CityLookup { status: ApiStatus::success(), location: None },
        ..FakeProvider::default()
    };

    let err = service::historical_weather(&provider, "Nowhere", &Utc::now(), 4).await.unwrap_err();

    assert!(matches!(err, WeatherError::CityNotFound { .. }));
    assert_eq!(provider.calls(), ["lookup:Nowhere"]);
}

#[tokio::test]
async fn current_conditions_carries_city_and_now_fields() {
    let mut provider = FakeProvider::with_city("7");
    provider.now = serde_json::from_value(json!({
        "code": "200",
        "now": { "temp": "21", "text": "多云", "humidity": "40" }
    }))
    .unwrap();

    let current = service::current_conditions(&provider, "上海").await.unwrap();

    assert_eq!(
        serde_json::to_value(&current).unwrap(),
        json!({ "city": "上海", "temp": "21", "text": "多云", "humidity": "40" })
    );
    assert_eq!(provider.calls(), ["lookup:上海", "now:7"]);
}

#[tokio::test]
async fn current_conditions_reports_upstream_status() {
    let mut provider = FakeProvider::with_city("7");
    provider.now = NowPayload { status: ApiStatus::failure("402", None), now: None };

    let err = service::current_conditions(&provider, "上海").await.unwrap_err();

    match err {
        WeatherError::UpstreamStatus { code, message } => {
            assert_eq!(code, "402");
            assert_eq!(message, "天气查询失败");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn forecast_passes_daily_entries_through() {
    let mut provider = FakeProvider::with_city("7");
    let daily = vec![
        json!({ "fxDate": "2024-03-06", "tempMax": "12", "tempMin": "3", "textDay": "晴" }),
        json!({ "fxDate": "2024-03-07", "tempMax": "10", "tempMin": "2", "textDay": "阴" }),
    ];
    provider.forecast = ForecastPayload { status: ApiStatus::success(), daily: Some(daily.clone()) };

    let forecast: Vec<Value> = service::daily_forecast(&provider, "上海").await.unwrap();
    assert_eq!(forecast, daily);
}

#[tokio::test]
async fn forecast_error_prefers_upstream_message() {
    let mut provider = FakeProvider::with_city("7");
    provider.forecast = ForecastPayload {
        status: ApiStatus::failure("429", Some("Too Many Requests")),
        daily: None,
    };

    let err = service::daily_forecast(&provider, "上海").await.unwrap_err();
    assert_eq!(err.to_string(), "Too Many Requests");
}

#[tokio::test]
async fn search_cities_returns_empty_on_error_status() {
    let provider = FakeProvider {
        lookup: CityLookup { status: ApiStatus::failure("404", None), location: None },
        ..FakeProvider::default()
    };

    let hits = service::search_cities(&provider, "zz").await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn search_cities_returns_all_hits() {
    let provider = FakeProvider::with_city("1");

    let hits = service::search_cities(&provider, "bei").await.unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, ["1", "999"]);
}

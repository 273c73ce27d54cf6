use chrono::{DateTime, Utc};
use leptos::leptos_dom::helpers::TimeoutHandle;
use leptos::logging::warn;
use leptos::*;

use crate::api::{Api, WeatherReport};
use crate::config::WeatherConfig;
use crate::loading::Loading;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    fn rounded(&self, decimals: u32) -> (f64, f64) {
        let factor = 10f64.powi(decimals as i32);
        (
            (self.lat * factor).round() / factor,
            (self.lon * factor).round() / factor,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    FetchNow,
    Debounce(std::time::Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Cached(WeatherReport),
    Fetch,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    coord: Coord,
    report: WeatherReport,
    fetched_at: DateTime<Utc>,
}

/// Decides when a coordinate delivery may hit the network: the first one
/// goes out immediately, later ones wait out the debounce window, and a
/// fresh cache entry for (roughly) the same spot short-circuits the fetch.
#[derive(Debug, Clone)]
pub struct WeatherStation {
    config: WeatherConfig,
    cache: Option<CacheEntry>,
    primed: bool,
}

impl WeatherStation {
    pub fn new(config: WeatherConfig) -> Self {
        WeatherStation {
            config,
            cache: None,
            primed: false,
        }
    }

    pub fn plan(&mut self) -> Plan {
        if self.primed {
            Plan::Debounce(self.config.debounce)
        } else {
            self.primed = true;
            Plan::FetchNow
        }
    }

    pub fn lookup(&mut self, coord: Coord, now: DateTime<Utc>) -> Lookup {
        let decimals = self.config.coord_decimals;
        match &self.cache {
            Some(entry)
                if entry.coord.rounded(decimals) == coord.rounded(decimals)
                    && now.signed_duration_since(entry.fetched_at) < self.config.cache_ttl =>
            {
                Lookup::Cached(entry.report.clone())
            }
            _ => Lookup::Fetch,
        }
    }

    pub fn store(&mut self, coord: Coord, report: WeatherReport, now: DateTime<Utc>) {
        self.cache = Some(CacheEntry {
            coord,
            report,
            fetched_at: now,
        });
    }
}

pub fn wind_kmh(meters_per_second: f64) -> i64 {
    (meters_per_second * 3.6).round() as i64
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherDisplay {
    pub city: String,
    pub description: String,
    pub icon: Option<String>,
    pub temp_c: i64,
    pub feels_like_c: i64,
    pub humidity: i64,
    pub wind_kmh: i64,
}

impl WeatherDisplay {
    pub fn from_report(report: &WeatherReport) -> Self {
        let condition = report.weather.first();
        WeatherDisplay {
            city: report.name.clone(),
            description: condition
                .map(|condition| condition.description.clone())
                .unwrap_or_default(),
            icon: condition.and_then(|condition| condition.icon.clone()),
            temp_c: report.main.temp.round() as i64,
            feels_like_c: report.main.feels_like.round() as i64,
            humidity: report.main.humidity.round() as i64,
            wind_kmh: wind_kmh(report.wind.speed),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum WeatherView {
    Idle,
    Loading,
    Ready(WeatherDisplay),
    Unavailable,
}

fn resolve(
    api: Api,
    station: StoredValue<WeatherStation>,
    set_view: WriteSignal<WeatherView>,
    coord: Coord,
) {
    match station.try_update_value(|station| station.lookup(coord, Utc::now())) {
        Some(Lookup::Cached(report)) => {
            set_view.set(WeatherView::Ready(WeatherDisplay::from_report(&report)));
        }
        Some(Lookup::Fetch) => {
            set_view.set(WeatherView::Loading);
            spawn_local(async move {
                match api.weather(coord.lat, coord.lon).await {
                    Ok(report) => {
                        let _ = station.try_update_value(|station| {
                            station.store(coord, report.clone(), Utc::now())
                        });
                        set_view.set(WeatherView::Ready(WeatherDisplay::from_report(&report)));
                    }
                    Err(err) => {
                        warn!("weather fetch failed: {err}");
                        set_view.set(WeatherView::Unavailable);
                    }
                }
            });
        }
        None => {}
    }
}

#[component]
pub fn WeatherWidget(#[prop(into)] coords: Signal<Option<Coord>>) -> impl IntoView {
    let api = expect_context::<Api>();
    let config = expect_context::<crate::config::Config>();
    let station = store_value(WeatherStation::new(config.weather.clone()));
    let pending = store_value(None::<TimeoutHandle>);
    let (view_state, set_view_state) = create_signal(WeatherView::Idle);

    let clear_pending = move || {
        if let Some(handle) = pending.get_value() {
            handle.clear();
            pending.set_value(None);
        }
    };

    {
        let api = api.clone();
        create_effect(move |_| {
            let Some(coord) = coords.get() else {
                clear_pending();
                return;
            };
            match station.try_update_value(|station| station.plan()) {
                Some(Plan::FetchNow) => resolve(api.clone(), station, set_view_state, coord),
                Some(Plan::Debounce(delay)) => {
                    clear_pending();
                    let api = api.clone();
                    let handle = set_timeout_with_handle(
                        move || resolve(api, station, set_view_state, coord),
                        delay,
                    );
                    match handle {
                        Ok(handle) => pending.set_value(Some(handle)),
                        Err(err) => warn!("could not schedule weather fetch: {err:?}"),
                    }
                }
                None => {}
            }
        });
    }
    on_cleanup(clear_pending);

    view! {
        <div class="flex items-center gap-3 px-4 py-3 bg-white rounded-lg shadow border dark:bg-gray-800 dark:border-gray-700 text-gray-900 dark:text-white">
            {move || match view_state.get() {
                WeatherView::Idle => view! {
                    <span class="text-sm text-gray-500 dark:text-gray-400">
                        "Pick a spot on the route to see the weather."
                    </span>
                }
                .into_view(),
                WeatherView::Loading => view! { <Loading /> }.into_view(),
                WeatherView::Unavailable => view! {
                    <span class="text-sm text-gray-500 dark:text-gray-400">
                        "Weather is unavailable right now."
                    </span>
                }
                .into_view(),
                WeatherView::Ready(display) => view! {
                    <div class="flex flex-col">
                        <span class="text-sm font-semibold">{display.city.clone()}</span>
                        <span class="text-xs text-gray-500 dark:text-gray-400 capitalize">
                            {display.description.clone()}
                        </span>
                    </div>
                    <div class="flex flex-col ms-auto text-right">
                        <span class="text-lg font-bold">{display.temp_c}"°C"</span>
                        <span class="text-xs text-gray-500 dark:text-gray-400">
                            "feels like "{display.feels_like_c}"° · "
                            {display.humidity}"% · "
                            {display.wind_kmh}" km/h"
                        </span>
                    </div>
                }
                .into_view(),
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{WeatherCondition, WeatherMain, WeatherWind};
    use chrono::TimeDelta;

    fn config() -> WeatherConfig {
        WeatherConfig::default()
    }

    fn report(temp: f64) -> WeatherReport {
        WeatherReport {
            main: WeatherMain {
                temp,
                feels_like: temp - 1.2,
                humidity: 61.0,
            },
            weather: vec![WeatherCondition {
                description: "scattered clouds".to_owned(),
                icon: Some("03d".to_owned()),
            }],
            wind: WeatherWind { speed: 5.0 },
            name: "Rize".to_owned(),
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_only_first_delivery_skips_debounce() {
        let mut station = WeatherStation::new(config());
        assert_eq!(station.plan(), Plan::FetchNow);
        assert_eq!(
            station.plan(),
            Plan::Debounce(std::time::Duration::from_secs(2))
        );
        assert_eq!(
            station.plan(),
            Plan::Debounce(std::time::Duration::from_secs(2))
        );
    }

    #[test]
    fn test_nearby_fresh_cache_hit() {
        let mut station = WeatherStation::new(config());
        let origin = Coord {
            lat: 41.00,
            lon: 29.00,
        };
        station.store(origin, report(17.4), t0());

        // 500ms later, ~400m away: same rounded cell, cache still fresh
        let nearby = Coord {
            lat: 41.004,
            lon: 29.004,
        };
        let now = t0() + TimeDelta::milliseconds(500);
        match station.lookup(nearby, now) {
            Lookup::Cached(cached) => assert_eq!(cached.main.temp, 17.4),
            Lookup::Fetch => panic!("expected a cache hit"),
        }
    }

    #[test]
    fn test_stale_cache_refetches() {
        let mut station = WeatherStation::new(config());
        let origin = Coord {
            lat: 41.00,
            lon: 29.00,
        };
        station.store(origin, report(17.4), t0());

        let now = t0() + TimeDelta::minutes(11);
        assert_eq!(station.lookup(origin, now), Lookup::Fetch);
    }

    #[test]
    fn test_distant_coordinate_refetches() {
        let mut station = WeatherStation::new(config());
        let origin = Coord {
            lat: 41.00,
            lon: 29.00,
        };
        station.store(origin, report(17.4), t0());

        let away = Coord {
            lat: 41.25,
            lon: 29.00,
        };
        let now = t0() + TimeDelta::seconds(1);
        assert_eq!(station.lookup(away, now), Lookup::Fetch);
    }

    #[test]
    fn test_burst_resolves_with_last_coordinate() {
        let mut station = WeatherStation::new(config());
        assert_eq!(station.plan(), Plan::FetchNow);
        station.store(
            Coord {
                lat: 41.00,
                lon: 29.00,
            },
            report(17.4),
            t0(),
        );

        // three quick drags; each one restarts the timer, so only the last
        // coordinate is ever resolved
        let mut latest = None;
        for lon in [29.1, 29.2, 29.3] {
            assert_eq!(
                station.plan(),
                Plan::Debounce(std::time::Duration::from_secs(2))
            );
            latest = Some(Coord { lat: 41.00, lon });
        }
        let last = latest.unwrap();
        assert_eq!(last.lon, 29.3);
        assert_eq!(station.lookup(last, t0() + TimeDelta::seconds(3)), Lookup::Fetch);
    }

    #[test]
    fn test_display_units() {
        let display = WeatherDisplay::from_report(&report(17.4));
        assert_eq!(display.temp_c, 17);
        assert_eq!(display.feels_like_c, 16);
        assert_eq!(display.humidity, 61);
        assert_eq!(display.wind_kmh, 18, "5 m/s is 18 km/h");
        assert_eq!(display.city, "Rize");
    }

    #[test]
    fn test_wind_rounding() {
        assert_eq!(wind_kmh(0.0), 0);
        assert_eq!(wind_kmh(5.0), 18);
        assert_eq!(wind_kmh(3.1), 11);
    }
}

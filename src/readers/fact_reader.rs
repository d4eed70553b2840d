use crate::error::Result;
use crate::models::TabularResult;
use crate::warehouse::Connector;

/// Denormalized weather facts. Inner joins throughout: a fact whose date,
/// city, country or condition reference dangles is dropped without notice.
/// `temp` is cast so NUMERIC and REAL columns both arrive as doubles.
pub const WEATHER_FACTS_STATEMENT: &str = "\
SELECT
    f.temperature_id,
    f.temp::double precision AS temp,
    d.full_date,
    ci.city_name,
    co.country_name,
    cond.condition_name
FROM fact.temperature f
JOIN dim.date d ON f.date_id = d.date_id
JOIN dim.city ci ON f.city_id = ci.city_id
JOIN dim.country co ON ci.country_id = co.country_id
JOIN dim.conditions cond ON f.condition_id = cond.condition_id";

pub async fn load_weather_facts<C: Connector + ?Sized>(connector: &C) -> Result<TabularResult> {
    connector.execute(WEATHER_FACTS_STATEMENT).await
}

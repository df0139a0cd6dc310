use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::debug;

use super::dates::{normalize_date_string, Clock};
use super::trait_def::Tool;
use crate::llm::ToolDescriptor;

pub const FLIGHT_NUMBER_TOOL: &str = "get_flight_number";
pub const TICKET_PRICE_TOOL: &str = "get_ticket_price";

/// Flight numbers returned by the simulated lookup
pub const MOCK_FLIGHT_NUMBERS: [&str; 3] = ["CA1501", "MU5101", "CZ3907"];

/// Simulated fares are drawn uniformly from this range, in CNY
pub const TICKET_PRICE_RANGE: RangeInclusive<u32> = 500..=2000;

fn decode_arguments<'a, T: Deserialize<'a>>(tool: &str, arguments: &'a str) -> Result<T> {
    serde_json::from_str(arguments)
        .with_context(|| format!("Invalid arguments for {}: {}", tool, arguments))
}

fn require_non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        bail!("Missing required parameter '{}'", field);
    }
    Ok(value)
}

#[derive(Debug, Deserialize)]
struct FlightQuery {
    departure: String,
    destination: String,
    date: String,
}

/// Looks up flight numbers between two cities on a date
pub struct FlightNumberTool {
    clock: Arc<dyn Clock>,
}

impl FlightNumberTool {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl Tool for FlightNumberTool {
    fn name(&self) -> &'static str {
        FLIGHT_NUMBER_TOOL
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            FLIGHT_NUMBER_TOOL,
            "根据始发地、目的地和日期，查询对应日期的航班号 \
             (look up flight numbers by departure city, destination city and date)",
        )
        .required_param("departure", "出发地 (departure city)")
        .required_param("destination", "目的地 (destination city)")
        .required_param(
            "date",
            "日期, yyyy-MM-dd or a relative day such as 今天/明天/后天/大后天",
        )
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let query: FlightQuery = decode_arguments(FLIGHT_NUMBER_TOOL, arguments)?;
        let departure = require_non_empty("departure", &query.departure)?;
        let destination = require_non_empty("destination", &query.destination)?;
        let date = normalize_date_string(&query.date, self.clock.today())?;

        debug!(departure, destination, %date, "Looking up flight numbers");

        Ok(format!(
            "Flights for departure={}, destination={}, date={}: {}",
            departure,
            destination,
            date,
            MOCK_FLIGHT_NUMBERS.join(", ")
        ))
    }
}

#[derive(Debug, Deserialize)]
struct FareQuery {
    flight_number: String,
    date: String,
}

/// Quotes a ticket price for a flight on a date
pub struct TicketPriceTool {
    clock: Arc<dyn Clock>,
}

impl TicketPriceTool {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl Tool for TicketPriceTool {
    fn name(&self) -> &'static str {
        TICKET_PRICE_TOOL
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            TICKET_PRICE_TOOL,
            "查询某航班在某日的票价 (look up the ticket price of a flight on a date)",
        )
        .required_param("flight_number", "航班号 (flight number, e.g. CA1501)")
        .required_param(
            "date",
            "日期, yyyy-MM-dd or a relative day such as 今天/明天/后天/大后天",
        )
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let query: FareQuery = decode_arguments(TICKET_PRICE_TOOL, arguments)?;
        let flight_number = require_non_empty("flight_number", &query.flight_number)?;
        let date = normalize_date_string(&query.date, self.clock.today())?;

        let price = rand::rng().random_range(TICKET_PRICE_RANGE);
        debug!(flight_number, %date, price, "Quoted ticket price");

        Ok(format!(
            "Ticket price for flight_number={}, date={}: {} CNY",
            flight_number, date, price
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::dates::FixedClock;
    use chrono::NaiveDate;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()))
    }

    fn parse_price(output: &str) -> u32 {
        output
            .rsplit(": ")
            .next()
            .and_then(|tail| tail.strip_suffix(" CNY"))
            .and_then(|number| number.parse().ok())
            .unwrap()
    }

    #[tokio::test]
    async fn test_flight_lookup() {
        let tool = FlightNumberTool::new(clock());
        let output = tool
            .execute(r#"{"departure":"北京","destination":"上海","date":"明天"}"#)
            .await
            .unwrap();

        assert!(output.contains("departure=北京"));
        assert!(output.contains("destination=上海"));
        assert!(output.contains("date=2024-06-02"));
        for flight in MOCK_FLIGHT_NUMBERS {
            assert!(output.contains(flight));
        }
    }

    #[tokio::test]
    async fn test_flight_lookup_missing_field() {
        let tool = FlightNumberTool::new(clock());
        let err = tool
            .execute(r#"{"departure":"北京","date":"today"}"#)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("destination"));
    }

    #[tokio::test]
    async fn test_flight_lookup_blank_field() {
        let tool = FlightNumberTool::new(clock());
        let err = tool
            .execute(r#"{"departure":"  ","destination":"上海","date":"today"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter 'departure'");
    }

    #[tokio::test]
    async fn test_ticket_price_in_range() {
        let tool = TicketPriceTool::new(clock());
        for _ in 0..20 {
            let output = tool
                .execute(r#"{"flight_number":"CA1501","date":"2024-06-05"}"#)
                .await
                .unwrap();
            assert!(output.contains("flight_number=CA1501"));
            assert!(output.contains("date=2024-06-05"));
            assert!(TICKET_PRICE_RANGE.contains(&parse_price(&output)));
        }
    }

    #[tokio::test]
    async fn test_ticket_price_bad_date() {
        let tool = TicketPriceTool::new(clock());
        let err = tool
            .execute(r#"{"flight_number":"CA1501","date":"someday"}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("someday"));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let tool = TicketPriceTool::new(clock());
        let err = tool.execute("{not json").await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid arguments for get_ticket_price"));
    }

    #[test]
    fn test_descriptors_declare_required_fields() {
        let flight = FlightNumberTool::new(clock()).descriptor();
        assert_eq!(flight.required, vec!["departure", "destination", "date"]);

        let price = TicketPriceTool::new(clock()).descriptor();
        assert_eq!(price.required, vec!["flight_number", "date"]);
        assert!(price.parameters.contains_key("flight_number"));
    }
}

//! Local functions the model may call
//!
//! - `registry`: the fixed catalog advertised in every request
//! - `executor`: dispatches a tool call by name and renders the result as text
//! - `implementations`: the flight-number and ticket-price lookups
//! - `dates`: natural-language date normalization shared by both lookups

pub mod dates;
pub mod executor;
pub mod implementations;
pub mod registry;
pub mod trait_def;

pub use dates::{normalize_date, Clock, FixedClock, InvalidDate, SystemClock};
pub use executor::FunctionExecutor;
pub use implementations::{
    FlightNumberTool, TicketPriceTool, FLIGHT_NUMBER_TOOL, MOCK_FLIGHT_NUMBERS,
    TICKET_PRICE_RANGE, TICKET_PRICE_TOOL,
};
pub use registry::ToolRegistry;
pub use trait_def::Tool;

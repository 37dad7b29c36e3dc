//! # Command Shell
//!
//! Line-oriented front end: one command per line on the input, one JSON
//! reply per line on the output.
//!
//! ## Grammar
//! ```text
//! show                         current trip
//! vehicle <type>               microbus | bus | minibus | taxi | custom
//! fare <amount>                per-seat fare, e.g. 12.50
//! capacity <n>                 seat count for the custom vehicle
//! pay <seat>                   open a payment for a seat
//! amount <amount>              amount handed over
//! cover <seat> | uncover <seat>
//! special on|off               free-form amount, covers nobody else
//! preview                      totals for the open payment
//! submit | cancel
//! given <seat> on|off          mark change as handed back
//! return <seat> <amount>       hand back part of the change
//! return-all <seat>
//! reset
//! help
//! quit | exit
//! ```
//!
//! ## Replies
//! ```json
//! {"ok":true,"data":{...}}
//! {"ok":false,"error":{"code":"VALIDATION_ERROR","message":"..."}}
//! ```

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::commands;
use crate::error::ApiError;
use crate::state::EngineState;
use ojra_core::{Money, PassengerId, VehicleType};

const HELP: &str = "show | vehicle <type> | fare <amount> | capacity <n> | pay <seat> | \
amount <amount> | cover <seat> | uncover <seat> | special on|off | preview | submit | \
cancel | given <seat> on|off | return <seat> <amount> | return-all <seat> | reset | quit";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Vehicle(VehicleType),
    Fare(Money),
    Capacity(i64),
    Pay(PassengerId),
    Amount(Money),
    Cover(PassengerId, bool),
    Special(bool),
    Preview,
    Submit,
    Cancel,
    ChangeGiven(PassengerId, bool),
    Return(PassengerId, Money),
    ReturnAll(PassengerId),
    Reset,
    Help,
    Quit,
}

/// Parses one line. Amount text goes through `Money`'s parser, so
/// non-numeric input and more than two decimals are handled there.
pub fn parse_command(line: &str) -> Result<Command, ApiError> {
    let mut words = line.split_whitespace();
    let verb = words
        .next()
        .ok_or_else(|| ApiError::invalid_command("empty command"))?
        .to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    let command = match (verb.as_str(), args.as_slice()) {
        ("show" | "trip", []) => Command::Show,
        ("vehicle", [kind]) => Command::Vehicle(kind.parse()?),
        ("fare", [amount]) => Command::Fare(amount.parse()?),
        ("capacity", [n]) => Command::Capacity(parse_int(n)?),
        ("pay", [seat]) => Command::Pay(parse_seat(seat)?),
        ("amount", [amount]) => Command::Amount(amount.parse()?),
        ("cover", [seat]) => Command::Cover(parse_seat(seat)?, true),
        ("uncover", [seat]) => Command::Cover(parse_seat(seat)?, false),
        ("special", [flag]) => Command::Special(parse_flag(flag)?),
        ("preview", []) => Command::Preview,
        ("submit", []) => Command::Submit,
        ("cancel", []) => Command::Cancel,
        ("given", [seat, flag]) => Command::ChangeGiven(parse_seat(seat)?, parse_flag(flag)?),
        ("return", [seat, amount]) => Command::Return(parse_seat(seat)?, amount.parse()?),
        ("return-all", [seat]) => Command::ReturnAll(parse_seat(seat)?),
        ("reset", []) => Command::Reset,
        ("help", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => {
            return Err(ApiError::invalid_command(format!(
                "unknown command '{}'; try 'help'",
                line.trim()
            )))
        }
    };

    Ok(command)
}

fn parse_int(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("'{}' is not a whole number", raw)))
}

fn parse_seat(raw: &str) -> Result<PassengerId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("'{}' is not a seat number", raw)))
}

fn parse_flag(raw: &str) -> Result<bool, ApiError> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        _ => Err(ApiError::validation(format!("'{}' is not on/off", raw))),
    }
}

/// Runs a parsed command against the engine.
pub fn execute(state: &EngineState, command: Command) -> Result<Value, ApiError> {
    let view = match command {
        Command::Show => commands::get_trip(state),
        Command::Vehicle(kind) => commands::select_vehicle(state, kind)?,
        Command::Fare(amount) => commands::set_fare(state, amount)?,
        Command::Capacity(n) => commands::set_custom_capacity(state, n)?,
        Command::Pay(seat) => commands::open_payment(state, seat)?,
        Command::Amount(amount) => commands::set_payment_amount(state, amount)?,
        Command::Cover(seat, covered) => commands::toggle_covered(state, seat, covered)?,
        Command::Special(on) => commands::set_special(state, on)?,
        Command::Preview => return to_json(&commands::preview_payment(state)?),
        Command::Submit => commands::submit_payment(state)?,
        Command::Cancel => commands::close_payment(state),
        Command::ChangeGiven(seat, given) => commands::toggle_change_given(state, seat, given)?,
        Command::Return(seat, amount) => commands::return_change(state, seat, amount)?,
        Command::ReturnAll(seat) => commands::return_all_change(state, seat)?,
        Command::Reset => commands::reset_trip(state)?,
        Command::Help => return Ok(Value::String(HELP.to_string())),
        Command::Quit => return Ok(Value::Null),
    };

    to_json(&view)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// Wraps a command result in the reply envelope.
pub fn reply(result: Result<Value, ApiError>) -> Value {
    match result {
        Ok(data) => json!({ "ok": true, "data": data }),
        Err(err) => json!({ "ok": false, "error": err }),
    }
}

/// Reads commands until end of input or `quit`, writing one reply per line.
/// Blank lines and lines starting with `#` are skipped.
pub async fn run_shell<R, W>(state: &EngineState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let result = match parse_command(line) {
            Ok(Command::Quit) => break,
            Ok(command) => execute(state, command),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            debug!(line, code = ?e.code, "Command rejected");
        }

        writer.write_all(reply(result).to_string().as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

//! Line commands and their mapping to actions.

use crate::api::Category;
use crate::error::{Error, Result};
use crate::state::{Action, AlertCondition, SortKey};
use uuid::Uuid;

/// Usage text for the command surface.
pub const HELP: &str = "\
commands:
  r | refresh                       fetch now and restart timers
  tab <all|top|trending|most_visited|new|gainers|losers|rwa>
  page <n> | n | p                  page of the 'all' tab
  filter [text]                     name/symbol filter (empty clears)
  sort <key>                        name, symbol, price, cap, 1h, 24h, holdings, value
  hold <asset-id> <quantity>        set held quantity
  alert <asset-id> <above|below> <price>
  unalert <alert-id>
  clear                             clear notifications
  show                              print the current view
  q | quit";

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Action>> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let action = match command.to_lowercase().as_str() {
        "" => return Ok(None),
        "r" | "refresh" => Action::RefreshNow,
        "q" | "quit" | "exit" => Action::Quit,
        "n" | "next" => Action::NextPage,
        "p" | "prev" => Action::PrevPage,
        "clear" => Action::ClearNotifications,
        "show" | "ls" => Action::ShowView,
        "tab" => Action::SetCategory(required(&args, 0, "tab")?.parse::<Category>()?),
        "page" => {
            let raw = required(&args, 0, "page")?;
            let page = raw
                .parse::<u32>()
                .map_err(|_| Error::invalid_input(format!("invalid page '{}'", raw)))?;
            Action::SetPage(page)
        }
        "filter" | "/" => Action::SetFilter(rest.to_string()),
        "sort" => Action::SetSort(required(&args, 0, "sort")?.parse::<SortKey>()?),
        "hold" => Action::SetHoldings {
            asset_id: required(&args, 0, "hold")?.to_string(),
            raw: args.get(1).copied().unwrap_or_default().to_string(),
        },
        "alert" => Action::AddAlert {
            asset_id: required(&args, 0, "alert")?.to_string(),
            condition: required(&args, 1, "alert")?.parse::<AlertCondition>()?,
            target_price: args.get(2).copied().unwrap_or_default().to_string(),
        },
        "unalert" => {
            let raw = required(&args, 0, "unalert")?;
            let id = Uuid::parse_str(raw)
                .map_err(|_| Error::invalid_input(format!("invalid alert id '{}'", raw)))?;
            Action::RemoveAlert(id)
        }
        other => {
            return Err(Error::invalid_input(format!("unknown command '{}'", other)));
        }
    };

    Ok(Some(action))
}

fn required<'a>(args: &[&'a str], index: usize, command: &str) -> Result<&'a str> {
    args.get(index)
        .copied()
        .ok_or_else(|| Error::invalid_input(format!("'{}' is missing an argument", command)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(line: &str) -> Action {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("r"), Action::RefreshNow);
        assert_eq!(parse("QUIT"), Action::Quit);
        assert_eq!(parse("tab gainers"), Action::SetCategory(Category::Gainers));
        assert_eq!(parse("page 3"), Action::SetPage(3));
        assert_eq!(parse("sort value"), Action::SetSort(SortKey::HoldingsValue));
    }

    #[test]
    fn test_filter_keeps_spaces() {
        assert_eq!(parse("filter shiba inu"), Action::SetFilter("shiba inu".into()));
        assert_eq!(parse("filter"), Action::SetFilter(String::new()));
    }

    #[test]
    fn test_hold_passes_raw_quantity() {
        assert_eq!(
            parse("hold bitcoin abc"),
            Action::SetHoldings {
                asset_id: "bitcoin".into(),
                raw: "abc".into()
            }
        );
    }

    #[test]
    fn test_alert() {
        assert_eq!(
            parse("alert bitcoin above 60000"),
            Action::AddAlert {
                asset_id: "bitcoin".into(),
                target_price: "60000".into(),
                condition: AlertCondition::Above,
            }
        );
    }

    #[test]
    fn test_errors() {
        assert!(parse_command("tab nowhere").is_err());
        assert!(parse_command("page x").is_err());
        assert!(parse_command("unalert 42").is_err());
        assert!(parse_command("dance").is_err());
        assert!(parse_command("alert bitcoin").is_err());
    }
}

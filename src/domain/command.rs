//! Chat command grammar: `/keyword[@botname] args...`.
//!
//! Keywords are case-sensitive. Arguments are whitespace-delimited; the last
//! argument of a command takes the rest of the line.

use crate::domain::DomainError;
use crate::domain::money::parse_amount;

/// Command keyword, recognised before its arguments are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Start,
    Help,
    AddIncome,
    AddExpense,
    Balance,
    SetBudget,
    Budget,
    Report,
    SetGoal,
    Goals,
    Categories,
    AddCategory,
    DeleteCategory,
    ListCategories,
}

impl CommandKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "start" => CommandKind::Start,
            "help" => CommandKind::Help,
            "addincome" => CommandKind::AddIncome,
            "addexpense" => CommandKind::AddExpense,
            "balance" => CommandKind::Balance,
            "setbudget" => CommandKind::SetBudget,
            "budget" => CommandKind::Budget,
            "report" => CommandKind::Report,
            "setgoal" => CommandKind::SetGoal,
            "goals" => CommandKind::Goals,
            "categories" => CommandKind::Categories,
            "addcategory" => CommandKind::AddCategory,
            "deletecategory" => CommandKind::DeleteCategory,
            "listcategories" => CommandKind::ListCategories,
            _ => return None,
        };
        Some(kind)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            CommandKind::Start => "start",
            CommandKind::Help => "help",
            CommandKind::AddIncome => "addincome",
            CommandKind::AddExpense => "addexpense",
            CommandKind::Balance => "balance",
            CommandKind::SetBudget => "setbudget",
            CommandKind::Budget => "budget",
            CommandKind::Report => "report",
            CommandKind::SetGoal => "setgoal",
            CommandKind::Goals => "goals",
            CommandKind::Categories => "categories",
            CommandKind::AddCategory => "addcategory",
            CommandKind::DeleteCategory => "deletecategory",
            CommandKind::ListCategories => "listcategories",
        }
    }

    /// Split a message into keyword and raw argument text.
    /// Returns None for plain text and unknown commands.
    pub fn parse_message(text: &str) -> Option<(Self, &str)> {
        let text = text.trim_start();
        let body = text.strip_prefix('/')?;
        let (head, args) = match body.find(char::is_whitespace) {
            Some(i) => (&body[..i], &body[i..]),
            None => (body, ""),
        };
        // "/report@my_finance_bot месяц" in group chats
        let keyword = head.split('@').next().unwrap_or(head);
        Self::from_keyword(keyword).map(|kind| (kind, args))
    }

    /// Parse the argument text for this keyword.
    pub fn parse_args(self, args: &str) -> Result<Command, DomainError> {
        let command = match self {
            CommandKind::Start => Command::Start,
            CommandKind::Help => Command::Help,
            CommandKind::AddIncome | CommandKind::AddExpense => {
                let parts = split_args(args, 1);
                let amount = parse_amount(required(&parts, 0, "amount")?)?;
                let description = parts.get(1).copied().unwrap_or("").to_string();
                if self == CommandKind::AddIncome {
                    Command::AddIncome {
                        amount,
                        description,
                    }
                } else {
                    Command::AddExpense {
                        amount,
                        description,
                    }
                }
            }
            CommandKind::Balance => Command::Balance,
            CommandKind::SetBudget => {
                let parts = split_args(args, 0);
                Command::SetBudget {
                    amount: parse_amount(required(&parts, 0, "amount")?)?,
                }
            }
            CommandKind::Budget => Command::Budget,
            CommandKind::Report => {
                let parts = split_args(args, 0);
                Command::Report {
                    period: required(&parts, 0, "period")?.to_string(),
                }
            }
            CommandKind::SetGoal => {
                let parts = split_args(args, 1);
                let name = required(&parts, 0, "goal")?.to_string();
                let amount = parse_amount(required(&parts, 1, "amount")?)?;
                Command::SetGoal { name, amount }
            }
            CommandKind::Goals => Command::Goals,
            CommandKind::Categories => Command::Categories,
            CommandKind::AddCategory => Command::AddCategory {
                name: required(&split_args(args, 0), 0, "category name")?.to_string(),
            },
            CommandKind::DeleteCategory => Command::DeleteCategory {
                name: required(&split_args(args, 0), 0, "category name")?.to_string(),
            },
            CommandKind::ListCategories => Command::ListCategories,
        };
        Ok(command)
    }
}

/// A fully parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    AddIncome { amount: f64, description: String },
    AddExpense { amount: f64, description: String },
    Balance,
    SetBudget { amount: f64 },
    Budget,
    /// Period is kept raw: an unknown token is answered with guidance, not an error.
    Report { period: String },
    SetGoal { name: String, amount: f64 },
    Goals,
    Categories,
    AddCategory { name: String },
    DeleteCategory { name: String },
    ListCategories,
}

fn required<'a>(
    parts: &[&'a str],
    idx: usize,
    name: &'static str,
) -> Result<&'a str, DomainError> {
    parts
        .get(idx)
        .copied()
        .ok_or(DomainError::MissingArgument(name))
}

/// Whitespace split with at most `maxsplit` splits; the last piece keeps inner whitespace.
fn split_args(s: &str, maxsplit: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = s.trim();
    while !rest.is_empty() {
        if out.len() == maxsplit {
            out.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(i) => {
                out.push(&rest[..i]);
                rest = rest[i..].trim_start();
            }
            None => {
                out.push(rest);
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Command, DomainError> {
        let (kind, args) = CommandKind::parse_message(text).expect("known command");
        kind.parse_args(args)
    }

    #[test]
    fn test_parse_message_keywords() {
        assert_eq!(
            CommandKind::parse_message("/balance"),
            Some((CommandKind::Balance, ""))
        );
        assert_eq!(
            CommandKind::parse_message("/report@finance_bot месяц").map(|(k, _)| k),
            Some(CommandKind::Report)
        );
        assert_eq!(CommandKind::parse_message("balance"), None);
        assert_eq!(CommandKind::parse_message("/Balance"), None);
        assert_eq!(CommandKind::parse_message("/unknown 1"), None);
        assert_eq!(CommandKind::parse_message("hello"), None);
    }

    #[test]
    fn test_keyword_roundtrip() {
        for kind in [
            CommandKind::Start,
            CommandKind::AddExpense,
            CommandKind::DeleteCategory,
            CommandKind::ListCategories,
        ] {
            assert_eq!(CommandKind::from_keyword(kind.keyword()), Some(kind));
        }
    }

    #[test]
    fn test_add_income_with_description() {
        assert_eq!(
            parse("/addincome 500 monthly  salary").unwrap(),
            Command::AddIncome {
                amount: 500.0,
                description: "monthly  salary".to_string()
            }
        );
        assert_eq!(
            parse("/addexpense 12.5").unwrap(),
            Command::AddExpense {
                amount: 12.5,
                description: String::new()
            }
        );
    }

    #[test]
    fn test_missing_and_invalid_amount() {
        assert!(matches!(
            parse("/addincome"),
            Err(DomainError::MissingArgument("amount"))
        ));
        assert!(matches!(
            parse("/addexpense ten coffee"),
            Err(DomainError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse("/setbudget"),
            Err(DomainError::MissingArgument("amount"))
        ));
    }

    #[test]
    fn test_set_goal_single_word_label() {
        assert_eq!(
            parse("/setgoal car 10000").unwrap(),
            Command::SetGoal {
                name: "car".to_string(),
                amount: 10000.0
            }
        );
        // label is one word; the remainder must be the amount
        assert!(matches!(
            parse("/setgoal new car 10000"),
            Err(DomainError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse("/setgoal car"),
            Err(DomainError::MissingArgument("amount"))
        ));
    }

    #[test]
    fn test_category_name_takes_rest_of_line() {
        assert_eq!(
            parse("/addcategory eating out").unwrap(),
            Command::AddCategory {
                name: "eating out".to_string()
            }
        );
        assert!(matches!(
            parse("/deletecategory   "),
            Err(DomainError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_report_period_kept_raw() {
        assert_eq!(
            parse("/report year").unwrap(),
            Command::Report {
                period: "year".to_string()
            }
        );
        assert!(matches!(
            parse("/report"),
            Err(DomainError::MissingArgument("period"))
        ));
    }
}

//! Routes a chat message to its handler and renders the reply text.
//!
//! Handlers return `Result<String, DomainError>`. Failures are rendered here as the
//! command's apology prefix followed by the error, so every failure still reaches the user as text.

use crate::domain::money::format_amount;
use crate::domain::{Command, CommandKind, DomainError, Period, UserId};
use crate::usecases::FinanceService;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{info, warn};

const WELCOME_TEXT: &str = "Здравствуйте! Я помогу вам управлять личными финансами.\n\
    Используйте команду /help для получения списка команд.";

const HELP_TEXT: &str = "Там, где указаны дополнительные параметры в квадратных скобках, \
    они требуются обязательно (без скобок, через пробел)\n\
    \n/addincome [сумма] [описание] - добавить доход\n\
    /addexpense [сумма] [описание] - добавить расход\n\
    /balance - показать баланс\n\
    /setbudget [сумма] - установить месячный бюджет\n\
    /budget - показать текущий бюджет\n\
    /report [период] - получить отчет за период (день, неделя, месяц)\n\
    /categories - управлять категориями\n\
    /setgoal [цель] [сумма] - установить финансовую цель\n\
    /goals - показать финансовые цели";

const CATEGORIES_HELP_TEXT: &str = "Доступные команды для управления категориями:\n\
    /addcategory [название] - добавить категорию\n\
    /deletecategory [название] - удалить категорию\n\
    /listcategories - показать список категорий";

const INVALID_PERIOD_TEXT: &str = "Неверный период. Используйте 'день', 'неделя' или 'месяц'.";

/// Fixed text that precedes a rendered failure. None for commands that cannot fail.
fn apology_prefix(kind: CommandKind) -> Option<&'static str> {
    let what = match kind {
        CommandKind::Start | CommandKind::Help | CommandKind::Categories => return None,
        CommandKind::AddIncome => "добавлении дохода",
        CommandKind::AddExpense => "добавлении расхода",
        CommandKind::Balance => "получении баланса",
        CommandKind::SetBudget => "установке бюджета",
        CommandKind::Budget => "получении текущего бюджета",
        CommandKind::Report => "генерации отчета",
        CommandKind::SetGoal => "установке финансовой цели",
        CommandKind::Goals => "получении финансовых целей",
        CommandKind::AddCategory => "добавлении категории",
        CommandKind::DeleteCategory => "удалении категории",
        CommandKind::ListCategories => "получении списка категорий",
    };
    Some(what)
}

fn render_failure(kind: CommandKind, err: &DomainError) -> String {
    match apology_prefix(kind) {
        Some(what) => format!("Произошла ошибка при {}: {}", what, err),
        None => format!("Произошла ошибка: {}", err),
    }
}

/// Command dispatcher shared by all chat adapters.
pub struct CommandDispatcher {
    finance: Arc<FinanceService>,
}

impl CommandDispatcher {
    pub fn new(finance: Arc<FinanceService>) -> Self {
        Self { finance }
    }

    /// Handle one inbound message. Returns None when the text is not a known command.
    pub async fn dispatch(&self, user_id: UserId, text: &str) -> Option<String> {
        let (kind, args) = CommandKind::parse_message(text)?;
        info!(user_id, command = kind.keyword(), "command received");

        let result = match kind.parse_args(args) {
            Ok(command) => self.handle(user_id, command).await,
            Err(e) => Err(e),
        };
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(user_id, command = kind.keyword(), error = %e, "command failed");
                render_failure(kind, &e)
            }
        };
        Some(reply)
    }

    /// Execute a parsed command and format its reply.
    pub async fn handle(&self, user_id: UserId, command: Command) -> Result<String, DomainError> {
        let reply = match command {
            Command::Start => WELCOME_TEXT.to_string(),
            Command::Help => HELP_TEXT.to_string(),
            Command::AddIncome {
                amount,
                description,
            } => {
                self.finance
                    .add_income(user_id, amount, &description)
                    .await?;
                format!("Доход в размере {} добавлен.", format_amount(amount))
            }
            Command::AddExpense {
                amount,
                description,
            } => {
                self.finance
                    .add_expense(user_id, amount, &description)
                    .await?;
                format!("Расход в размере {} добавлен.", format_amount(amount))
            }
            Command::Balance => {
                let balance = self.finance.balance(user_id).await?;
                format!("Текущий баланс: {} руб.", format_amount(balance))
            }
            Command::SetBudget { amount } => {
                self.finance.set_budget(user_id, amount).await?;
                format!("Месячный бюджет установлен: {} руб.", format_amount(amount))
            }
            Command::Budget => {
                let budget = self.finance.budget(user_id).await?;
                format!("Текущий месячный бюджет: {} руб.", format_amount(budget))
            }
            Command::Report { period } => {
                // Unknown period: guidance only, the store is not touched.
                let Some(period) = Period::from_token(&period) else {
                    return Ok(INVALID_PERIOD_TEXT.to_string());
                };
                let totals = self.finance.report(user_id, period).await?;
                format!(
                    "Отчет за {}:\nДоходы: {} руб.\nРасходы: {} руб.\nБаланс: {} руб.",
                    period.token(),
                    format_amount(totals.income),
                    format_amount(totals.expenses),
                    format_amount(totals.net())
                )
            }
            Command::SetGoal { name, amount } => {
                self.finance.set_goal(user_id, &name, amount).await?;
                format!(
                    "Финансовая цель '{}' на сумму {} установлена.",
                    name,
                    format_amount(amount)
                )
            }
            Command::Goals => {
                let goals = self.finance.goals(user_id).await?;
                if goals.is_empty() {
                    "У вас пока нет установленных финансовых целей.".to_string()
                } else {
                    let mut out = String::from("Ваши финансовые цели:\n");
                    for goal in &goals {
                        let _ = writeln!(out, "- {}: {} руб.", goal.name, format_amount(goal.amount));
                    }
                    out
                }
            }
            Command::Categories => CATEGORIES_HELP_TEXT.to_string(),
            Command::AddCategory { name } => {
                self.finance.add_category(user_id, &name).await?;
                format!("Категория '{}' добавлена.", name)
            }
            Command::DeleteCategory { name } => {
                self.finance.delete_category(user_id, &name).await?;
                format!("Категория '{}' удалена.", name)
            }
            Command::ListCategories => {
                let categories = self.finance.categories(user_id).await?;
                if categories.is_empty() {
                    "У вас пока нет добавленных категорий расходов.".to_string()
                } else {
                    let lines: Vec<String> =
                        categories.iter().map(|c| format!("- {}", c.name)).collect();
                    format!("Список категорий расходов:\n{}", lines.join("\n"))
                }
            }
        };
        Ok(reply)
    }
}

//! 单表查询约束检查
//!
//! 在提交给分析器之前，本地确认生成的 SQL 只访问允许的那一张表。
//!
//! 使用 ClickHouse 方言解析。Proton 的简写时间间隔（如 `hop(t_metrics, _tp_time, 10s, 60s)`）
//! 无法解析，会返回 `Parse` 而不是约束违规；需要检查的 SQL 请写成 `INTERVAL 10 SECOND`。

use sqlparser::ast::{
    Expr, FunctionArg, FunctionArgExpr, FunctionArguments, ObjectName, Query, SetExpr,
    Statement, TableFactor, Visit, Visitor,
};
use sqlparser::dialect::ClickHouseDialect;
use sqlparser::parser::Parser;
use std::collections::HashSet;
use std::ops::ControlFlow;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardViolation {
    #[error("SQL 无法解析，未进行单表检查: {0}")]
    Parse(String),

    #[error("只允许一条 SQL 语句，实际为 {0} 条")]
    MultipleStatements(usize),

    #[error("只允许查询语句")]
    NotAQuery,

    #[error("不允许 JOIN，只能查询单表")]
    JoinNotAllowed,

    #[error("不允许访问表 {0}")]
    ForeignTable(String),
}

/// 检查 SQL 是否只查询 `table`
pub fn check_single_table(sql: &str, table: &str) -> Result<(), GuardViolation> {
    let statements = Parser::parse_sql(&ClickHouseDialect {}, sql)
        .map_err(|e| GuardViolation::Parse(e.to_string()))?;

    match statements.len() {
        0 => return Err(GuardViolation::NotAQuery),
        1 => {}
        n => return Err(GuardViolation::MultipleStatements(n)),
    }
    if !matches!(statements[0], Statement::Query(_)) {
        return Err(GuardViolation::NotAQuery);
    }

    let mut visitor = SingleTableVisitor {
        allowed: normalize(table),
        ctes: HashSet::new(),
        in_table_function: false,
    };
    match statements.visit(&mut visitor) {
        ControlFlow::Break(violation) => Err(violation),
        ControlFlow::Continue(()) => {
            debug!("SQL 通过单表检查: {}", table);
            Ok(())
        }
    }
}

struct SingleTableVisitor {
    allowed: String,
    // WITH 子句定义的名称，主体仍会被单独检查
    ctes: HashSet<String>,
    // 表函数名（tumble/hop 等）会作为 relation 访问，需要跳过
    in_table_function: bool,
}

impl SingleTableVisitor {
    fn check_name(&self, name: &str) -> ControlFlow<GuardViolation> {
        let normalized = normalize(name);
        if normalized == self.allowed || self.ctes.contains(&normalized) {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(GuardViolation::ForeignTable(name.to_string()))
        }
    }
}

impl Visitor for SingleTableVisitor {
    type Break = GuardViolation;

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if has_join(&query.body) {
            return ControlFlow::Break(GuardViolation::JoinNotAllowed);
        }
        if let Some(with) = &query.with {
            self.ctes.extend(
                with.cte_tables
                    .iter()
                    .map(|cte| normalize(&cte.alias.name.value)),
            );
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_table_factor(&mut self, factor: &TableFactor) -> ControlFlow<Self::Break> {
        match factor {
            // tumble(t_metrics, _tp_time, ...) 之类的表函数，第一个参数必须是允许的表
            TableFactor::Table {
                name,
                args: Some(args),
                ..
            } => {
                self.in_table_function = true;
                match args.args.first() {
                    Some(first) => self.check_name(&table_argument(first)),
                    None => ControlFlow::Break(GuardViolation::ForeignTable(name.to_string())),
                }
            }
            // table(t_metrics)
            TableFactor::TableFunction { expr, .. } => self.check_name(&expr.to_string()),
            _ => ControlFlow::Continue(()),
        }
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        if std::mem::take(&mut self.in_table_function) {
            return ControlFlow::Continue(());
        }
        self.check_name(&relation.to_string())
    }
}

/// 表函数的第一个参数；`table(x)` 取内部的 `x`
fn table_argument(arg: &FunctionArg) -> String {
    if let FunctionArg::Unnamed(FunctionArgExpr::Expr(Expr::Function(func))) = arg {
        if normalize(&func.name.to_string()) == "table" {
            if let FunctionArguments::List(list) = &func.args {
                if let Some(inner) = list.args.first() {
                    return table_argument(inner);
                }
            }
        }
    }
    arg.to_string()
}

fn has_join(body: &SetExpr) -> bool {
    match body {
        SetExpr::Select(select) => {
            select.from.len() > 1 || select.from.iter().any(|t| !t.joins.is_empty())
        }
        SetExpr::SetOperation { left, right, .. } => has_join(left) || has_join(right),
        _ => false,
    }
}

/// 取最后一段名称，去掉引号并转小写
fn normalize(name: &str) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    last.trim_matches(|c| c == '`' || c == '"')
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "t_metrics";

    #[test]
    fn test_simple_query_passes() {
        let sql = "SELECT metric, to_float64(value) AS val FROM t_metrics \
                   WHERE metric = 'cpu_usage' LIMIT 10";
        assert_eq!(check_single_table(sql, TABLE), Ok(()));
    }

    #[test]
    fn test_qualified_and_quoted_names() {
        assert_eq!(
            check_single_table("SELECT count(*) FROM default.t_metrics", TABLE),
            Ok(())
        );
        assert_eq!(
            check_single_table("SELECT count(*) FROM `t_metrics`", TABLE),
            Ok(())
        );
    }

    #[test]
    fn test_self_subquery_passes() {
        let sql = "SELECT metric FROM t_metrics WHERE metric IN \
                   (SELECT metric FROM t_metrics WHERE tagK1 = 'region')";
        assert_eq!(check_single_table(sql, TABLE), Ok(()));
    }

    #[test]
    fn test_window_function_passes() {
        let sql = "SELECT window_start, avg(to_float64(value)) \
                   FROM tumble(t_metrics, _tp_time, INTERVAL 1 MINUTE) \
                   GROUP BY window_start";
        assert_eq!(check_single_table(sql, TABLE), Ok(()));
    }

    #[test]
    fn test_window_over_other_table_rejected() {
        let sql = "SELECT window_start, count() \
                   FROM tumble(orders, _tp_time, INTERVAL 1 MINUTE) \
                   GROUP BY window_start";
        assert_eq!(
            check_single_table(sql, TABLE),
            Err(GuardViolation::ForeignTable("orders".to_string()))
        );
    }

    #[test]
    fn test_window_over_historical_table() {
        let sql = "SELECT window_start, count() \
                   FROM tumble(table(t_metrics), _tp_time, INTERVAL 1 MINUTE) \
                   GROUP BY window_start";
        assert_eq!(check_single_table(sql, TABLE), Ok(()));

        let other = "SELECT window_start, count() \
                     FROM tumble(table(orders), _tp_time, INTERVAL 1 MINUTE) \
                     GROUP BY window_start";
        assert_eq!(
            check_single_table(other, TABLE),
            Err(GuardViolation::ForeignTable("orders".to_string()))
        );
    }

    #[test]
    fn test_hop_window() {
        let sql = "SELECT window_start, max(to_float64(value)) \
                   FROM hop(t_metrics, _tp_time, INTERVAL 10 SECOND, INTERVAL 60 SECOND) \
                   GROUP BY window_start";
        assert_eq!(check_single_table(sql, TABLE), Ok(()));

        // 简写间隔无法解析，报告为解析失败
        let short = "SELECT window_start, count() FROM hop(t_metrics, _tp_time, 10s, 60s) \
                     GROUP BY window_start";
        assert!(matches!(
            check_single_table(short, TABLE),
            Err(GuardViolation::Parse(_))
        ));
    }

    #[test]
    fn test_cte_over_allowed_table() {
        let sql = "WITH recent AS (SELECT * FROM t_metrics WHERE _tp_time > now() - INTERVAL 1 HOUR) \
                   SELECT metric, count() FROM recent GROUP BY metric";
        assert_eq!(check_single_table(sql, TABLE), Ok(()));

        // CTE 主体仍需检查
        let foreign = "WITH recent AS (SELECT * FROM orders) SELECT count() FROM recent";
        assert_eq!(
            check_single_table(foreign, TABLE),
            Err(GuardViolation::ForeignTable("orders".to_string()))
        );
    }

    #[test]
    fn test_join_rejected() {
        let sql = "SELECT a.metric FROM t_metrics a JOIN t_metrics b ON a.metric = b.metric";
        assert_eq!(
            check_single_table(sql, TABLE),
            Err(GuardViolation::JoinNotAllowed)
        );

        let comma = "SELECT * FROM t_metrics, orders";
        assert_eq!(
            check_single_table(comma, TABLE),
            Err(GuardViolation::JoinNotAllowed)
        );
    }

    #[test]
    fn test_foreign_tables_rejected() {
        assert_eq!(
            check_single_table("SELECT * FROM orders", TABLE),
            Err(GuardViolation::ForeignTable("orders".to_string()))
        );

        let sub = "SELECT * FROM t_metrics WHERE metric IN (SELECT name FROM metric_dict)";
        assert_eq!(
            check_single_table(sub, TABLE),
            Err(GuardViolation::ForeignTable("metric_dict".to_string()))
        );
    }

    #[test]
    fn test_statement_shape() {
        assert_eq!(
            check_single_table("DROP TABLE t_metrics", TABLE),
            Err(GuardViolation::NotAQuery)
        );
        assert_eq!(
            check_single_table("SELECT 1 FROM t_metrics; SELECT 2 FROM t_metrics", TABLE),
            Err(GuardViolation::MultipleStatements(2))
        );
        assert!(matches!(
            check_single_table("SELEC metric FROM", TABLE),
            Err(GuardViolation::Parse(_))
        ));
    }
}

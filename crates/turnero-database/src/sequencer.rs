//! Sequential human-readable ticket code generation.
//!
//! Codes are unique and monotonically increasing within a
//! (calendar day, branch, type) partition and restart at 1 daily.
//! Concurrent issuance for the same partition is serialized by a
//! transaction-scoped advisory lock keyed by a deterministic hash of
//! the partition; unrelated partitions never contend. Gaps are
//! acceptable, duplicates are not.

use chrono::{DateTime, Days, NaiveDate, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use turnero_core::error::{AppError, ErrorKind};
use turnero_core::result::AppResult;
use turnero_entity::ticket::TicketType;

/// Issues the next ticket code for a partition.
///
/// Must be called inside the same transaction that inserts the ticket;
/// the advisory lock is released automatically at transaction end.
pub async fn next_code(
    tx: &mut Transaction<'_, Postgres>,
    ticket_type: TicketType,
    branch_id: Uuid,
    when: DateTime<Utc>,
) -> AppResult<String> {
    let day = when.date_naive();
    let key = partition_key(day, ticket_type, branch_id);

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(key)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire sequencer lock", e)
        })?;

    let day_start = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::internal("Invalid day start"))?
        .and_utc();
    let day_end = day
        .checked_add_days(Days::new(1))
        .ok_or_else(|| AppError::internal("Invalid day end"))?
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::internal("Invalid day end"))?
        .and_utc();

    let last_code: Option<String> = sqlx::query_scalar(
        "SELECT code FROM tickets \
         WHERE type = $1 AND branch_id = $2 AND created_at >= $3 AND created_at < $4 \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(ticket_type)
    .bind(branch_id)
    .bind(day_start)
    .bind(day_end)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to read last ticket code", e)
    })?;

    let next_sequence = last_code
        .as_deref()
        .and_then(parse_sequence)
        .map_or(1, |seq| seq + 1);

    Ok(format_code(ticket_type, next_sequence))
}

/// Formats a code as prefix letter + 4-digit zero-padded sequence.
pub fn format_code(ticket_type: TicketType, sequence: u32) -> String {
    format!("{}{:04}", ticket_type.prefix(), sequence)
}

/// Parses the numeric sequence out of a code, ignoring the prefix.
pub fn parse_sequence(code: &str) -> Option<u32> {
    code.get(1..).and_then(|s| s.parse().ok())
}

/// Deterministic advisory-lock key for a (day, type, branch) partition.
///
/// 31-polynomial hash modulo 2147483647 over `"{day}|{disc}|{branch}"`,
/// with 0 mapped to 1 so the key is never the null lock.
pub fn partition_key(day: NaiveDate, ticket_type: TicketType, branch_id: Uuid) -> i64 {
    let input = format!(
        "{}|{}|{}",
        day.format("%Y-%m-%d"),
        ticket_type.partition_discriminant(),
        branch_id
    );

    let mut hash: i64 = 0;
    for ch in input.chars() {
        hash = (hash * 31 + ch as i64) % 2_147_483_647;
    }

    if hash == 0 { 1 } else { hash }
}

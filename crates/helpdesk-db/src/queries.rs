use crate::models::{MessageRow, NewMessage, UserRow};
use crate::repository::{MessageRepository, UserRepository};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, Params, Row};

const SELECT_MESSAGES: &str = "SELECT id, userid, timestamp, message_body, response FROM message";

impl UserRepository for Database {
    fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO user (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            );
            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(e) if is_unique_violation(&e) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, username, password FROM user WHERE username = ?1",
                [username],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password: row.get(2)?,
                    })
                },
            )
            .optional()
        })
    }
}

impl MessageRepository for Database {
    fn insert_message(&self, message: &NewMessage) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO message (userid, timestamp, message_body) VALUES (?1, ?2, ?3)",
                rusqlite::params![message.userid, message.timestamp, message.message_body],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn insert_messages(&self, messages: &[NewMessage]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO message (userid, timestamp, message_body) VALUES (?1, ?2, ?3)",
                )?;
                for m in messages {
                    stmt.execute(rusqlite::params![m.userid, m.timestamp, m.message_body])?;
                }
            }
            tx.commit()?;
            Ok(messages.len())
        })
    }

    fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{SELECT_MESSAGES} WHERE id = ?1"), [id], message_from_row)
                .optional()
        })
    }

    fn list_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, "", []))
    }

    fn messages_for_user(&self, userid: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, "WHERE userid = ?1", [userid]))
    }

    fn search_messages(&self, keyword: &str) -> Result<Vec<MessageRow>> {
        let pattern = like_pattern(keyword);
        // SQLite LIKE folds ASCII case only.
        self.with_conn(|conn| {
            query_messages(conn, "WHERE message_body LIKE ?1 ESCAPE '\\'", [pattern])
        })
    }

    fn stamp_messages_for_user(&self, userid: i64, timestamp: &str) -> Result<Vec<MessageRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE message SET timestamp = ?2 WHERE userid = ?1",
                rusqlite::params![userid, timestamp],
            )?;
            let rows = query_messages(&tx, "WHERE userid = ?1", [userid])?;
            tx.commit()?;
            Ok(rows)
        })
    }

    fn set_response(&self, id: i64, response: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE message SET response = ?2 WHERE id = ?1",
                rusqlite::params![id, response],
            )?;
            Ok(updated > 0)
        })
    }
}

fn query_messages<P: Params>(conn: &Connection, filter: &str, params: P) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(&format!("{SELECT_MESSAGES} {filter} ORDER BY id"))?;

    let rows = stmt
        .query_map(params, message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        userid: row.get(1)?,
        timestamp: row.get(2)?,
        message_body: row.get(3)?,
        response: row.get(4)?,
    })
}

/// `%keyword%` with LIKE wildcards in the keyword matched literally.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

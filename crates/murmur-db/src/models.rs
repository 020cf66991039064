/// Database row types, mapped directly from SQLite rows.
/// Kept apart from murmur-types so the password hash stays in this layer.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

pub struct MessageRow {
    pub id: i64,
    pub message: String,
}

/// All run timestamps are UTC; rendering into a local offset happens at the edges.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

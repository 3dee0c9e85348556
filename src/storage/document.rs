use serde::{Deserialize, Serialize};

use crate::timeline::{activity_tree::ActivityTree, log::TimelineLog};

/// Everything persisted for one user. Both halves are always written together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineDocument {
    pub timeline: TimelineLog,
    pub activities: ActivityTree,
}

/// Serializes timestamps as `YYYY-MM-DD_HH:MM:SS` in UTC.
pub mod timestamp_ser {
    use chrono::{DateTime, Utc};
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    use crate::utils::time::{format_timestamp, parse_timestamp};

    pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_timestamp(&s).map_err(|e| D::Error::custom(format!("invalid timestamp {s}: {e}")))
    }

    pub mod optional {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(time: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match time {
                Some(time) => super::serialize(time, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "crate::storage::document::timestamp_ser")] DateTime<Utc>);

            let value = Option::<Wrapper>::deserialize(deserializer)?;
            Ok(value.map(|Wrapper(time)| time))
        }
    }
}

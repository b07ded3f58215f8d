use chrono::{DateTime, Duration, SubsecRound, Utc};

/// マイクロ秒に丸めた現在時刻（PostgreSQL の timestamptz 精度に合わせる）
pub fn truncated_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// `previous` より厳密に後の時刻を返す。
///
/// 時計が保存済みの値を追い越していない場合は 1µs だけ進める。
pub fn advance_past(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = truncated_now();
    if now > previous {
        now
    } else {
        previous.trunc_subsecs(6) + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_truncated_now_has_microsecond_precision() {
        let now = truncated_now();
        assert_eq!(now.nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_advance_past_with_future_timestamp() {
        let future = truncated_now() + Duration::hours(1);
        let advanced = advance_past(future);
        assert_eq!(advanced, future + Duration::microseconds(1));
    }

    #[test]
    fn test_advance_past_with_old_timestamp() {
        let old = truncated_now() - Duration::days(1);
        let advanced = advance_past(old);
        assert!(advanced > old);
        assert!(advanced <= truncated_now());
    }
}

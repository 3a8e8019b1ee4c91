use nanoid::nanoid;

/// サブスクリプションID用のnanoIdを生成する
///
/// # 戻り値
/// 21文字のURL-safeなnanoId
///
/// # 特性
/// - 文字セット: A-Za-z0-9_- (64文字)
/// - 長さ: 21文字
/// - 乱数のみで生成するため、同一ミリ秒内の連続生成でも衝突しない
pub fn generate_subscription_id() -> String {
    nanoid!()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_subscription_id_length() {
        let id = generate_subscription_id();
        assert_eq!(id.len(), 21);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }

    #[test]
    fn test_generate_subscription_id_uniqueness() {
        // 同一ミリ秒内に大量生成しても重複しない
        let ids: HashSet<String> = (0..1000).map(|_| generate_subscription_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}

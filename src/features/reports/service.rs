use crate::features::reports::models::{DayGroup, MonthlyTotal, SortOrder};
use crate::features::spendings::models::SpendingRecord;
use chrono::NaiveDate;
use log::warn;
use std::collections::{BTreeMap, HashMap};

/// 検索語で支出リストを絞り込む
///
/// # 引数
/// * `records` - 支出リスト
/// * `term` - 検索語（空文字列の場合は全件を返す）
///
/// # 戻り値
/// 説明またはカテゴリに検索語を含む支出の部分列（元の順序を保持）
///
/// # マッチング規則
/// 大文字小文字を区別しない部分文字列一致
pub fn filter_spendings(records: &[SpendingRecord], term: &str) -> Vec<SpendingRecord> {
    if term.is_empty() {
        return records.to_vec();
    }

    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.description.to_lowercase().contains(&needle)
                || r.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// 支出リストを暦日ごとにグループ化する
///
/// # 引数
/// * `records` - 支出リスト
///
/// # 戻り値
/// 日別グループのリスト。グループは初出順、グループ内は入力順。
/// キーのソートは行わない（並び替えはsort_day_groupsの責務）
pub fn group_by_day(records: &[SpendingRecord]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();

    for record in records {
        let key = day_key(&record.date);
        match groups.iter_mut().find(|g| g.date == key) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(DayGroup {
                date: key.to_string(),
                records: vec![record.clone()],
            }),
        }
    }

    groups
}

/// 日別グループを暦日順に並び替える
///
/// # 引数
/// * `groups` - 日別グループのリスト
/// * `order` - 並び順（昇順または降順）
///
/// # 戻り値
/// 並び替えた日別グループのリスト。グループ内の順序は変更しない。
/// 日付キーはグループ化の時点で一意なので、同順位の扱いは発生しない
pub fn sort_day_groups(mut groups: Vec<DayGroup>, order: SortOrder) -> Vec<DayGroup> {
    groups.sort_by(|a, b| {
        let date_a = parse_day(&a.date);
        let date_b = parse_day(&b.date);
        match order {
            SortOrder::Ascending => date_a.cmp(&date_b),
            SortOrder::Descending => date_b.cmp(&date_a),
        }
    });
    groups
}

/// 今月の支出合計を計算する
///
/// # 引数
/// * `records` - 支出リスト（絞り込み前の全件）
/// * `today` - 基準日
///
/// # 戻り値
/// 基準日と同じ年月の支出の合計金額
pub fn current_month_total(records: &[SpendingRecord], today: NaiveDate) -> f64 {
    let month = today.format("%Y-%m").to_string();
    records
        .iter()
        .filter(|r| month_key(&r.date) == month)
        .filter_map(parse_amount)
        .sum()
}

/// 今月のカテゴリ別支出合計を計算する
///
/// # 引数
/// * `records` - 支出リスト（絞り込み前の全件）
/// * `today` - 基準日
///
/// # 戻り値
/// カテゴリ名から合計金額へのマッピング。順序は持たない
/// （表示順はプレゼンテーション層が決める）
pub fn current_month_category_totals(
    records: &[SpendingRecord],
    today: NaiveDate,
) -> HashMap<String, f64> {
    let month = today.format("%Y-%m").to_string();
    let mut totals = HashMap::new();

    for record in records.iter().filter(|r| month_key(&r.date) == month) {
        if let Some(amount) = parse_amount(record) {
            *totals.entry(record.category.clone()).or_insert(0.0) += amount;
        }
    }

    totals
}

/// 全期間の月別支出合計を時系列順に計算する
///
/// # 引数
/// * `records` - 支出リスト（絞り込み前の全件）
///
/// # 戻り値
/// 月別合計のリスト（年月の昇順）。支出が1件もない月は含まれない
pub fn monthly_series(records: &[SpendingRecord]) -> Vec<MonthlyTotal> {
    // YYYY-MM表記は辞書順がそのまま時系列順になるため、BTreeMapで集計する
    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();

    for record in records {
        if let Some(amount) = parse_amount(record) {
            *buckets.entry(month_key(&record.date).to_string()).or_insert(0.0) += amount;
        }
    }

    buckets
        .into_iter()
        .map(|(month, total)| MonthlyTotal { month, total })
        .collect()
}

/// 日付文字列から暦日部分を取り出す
///
/// 日時付きで保存された過去データに備えて、"T"以降を切り捨てる
fn day_key(date: &str) -> &str {
    date.split('T').next().unwrap_or(date)
}

/// 日付文字列からYYYY-MM形式の月キーを取り出す
fn month_key(date: &str) -> &str {
    let day = day_key(date);
    day.get(..7).unwrap_or(day)
}

/// 日付キーを暦日として解析する
///
/// 解析できないキーは最古の日付として扱い、並び替えを壊さない
fn parse_day(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
}

/// 支出の金額を数値として解析する
///
/// 入力時のバリデーション以前に永続化された過去データには数値として
/// 解釈できない金額が残っている可能性がある。そうした値はNaNとして
/// 合計に伝播させず、警告ログを残して集計から除外する
fn parse_amount(record: &SpendingRecord) -> Option<f64> {
    match record.amount.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            warn!(
                "数値として解釈できない金額を集計から除外しました: id={}, amount={}",
                record.id, record.amount
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn record(id: &str, amount: &str, category: &str, description: &str, date: &str) -> SpendingRecord {
        SpendingRecord {
            id: id.to_string(),
            amount: amount.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            date: date.to_string(),
        }
    }

    fn records_from_amounts(amounts: &[u32], date: &str) -> Vec<SpendingRecord> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| record(&format!("id-{i}"), &a.to_string(), "Food", "テスト", date))
            .collect()
    }

    #[test]
    fn test_filter_empty_term_is_identity() {
        let records = vec![
            record("1", "100", "Food", "Lunch", "2024-03-15"),
            record("2", "200", "Bills", "Electricity", "2024-03-16"),
        ];

        // 空の検索語は恒等写像（順序も保持）
        assert_eq!(filter_spendings(&records, ""), records);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let records = vec![record("1", "100", "Food", "Lunch", "2024-03-15")];

        // 大文字小文字を区別せずにマッチする
        assert_eq!(filter_spendings(&records, "LUNCH").len(), 1);
        assert_eq!(filter_spendings(&records, "lunch").len(), 1);
        assert_eq!(filter_spendings(&records, "unc").len(), 1);
    }

    #[test]
    fn test_filter_matches_category_or_description() {
        let records = vec![
            record("1", "100", "Food", "Lunch", "2024-03-15"),
            record("2", "200", "Transport", "Train ticket", "2024-03-15"),
            record("3", "300", "Bills", "Electricity", "2024-03-16"),
        ];

        // カテゴリでのマッチ
        let by_category = filter_spendings(&records, "transport");
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].id, "2");

        // 説明でのマッチ
        let by_description = filter_spendings(&records, "electricity");
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, "3");

        // マッチしない検索語
        assert!(filter_spendings(&records, "cinema").is_empty());
    }

    #[test]
    fn test_filter_preserves_order() {
        let records = vec![
            record("1", "100", "Food", "Lunch", "2024-03-15"),
            record("2", "200", "Transport", "Train", "2024-03-15"),
            record("3", "300", "Food", "Dinner", "2024-03-16"),
        ];

        let filtered = filter_spendings(&records, "food");
        let ids: Vec<&str> = filtered.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_group_by_day_keys_and_order() {
        let records = vec![
            record("1", "100", "Food", "Lunch", "2024-03-15"),
            record("2", "200", "Bills", "Electricity", "2024-03-16"),
            record("3", "300", "Food", "Dinner", "2024-03-15"),
        ];

        let groups = group_by_day(&records);

        // グループは初出順、グループ内は入力順
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, "2024-03-15");
        assert_eq!(groups[0].records.len(), 2);
        assert_eq!(groups[0].records[0].id, "1");
        assert_eq!(groups[0].records[1].id, "3");
        assert_eq!(groups[1].date, "2024-03-16");
        assert_eq!(groups[1].records[0].id, "2");
    }

    #[test]
    fn test_group_by_day_truncates_datetime_values() {
        // 日時付きで保存された過去データは日付部分でグループ化される
        let records = vec![
            record("1", "100", "Food", "Lunch", "2024-03-15T09:30:00"),
            record("2", "200", "Food", "Dinner", "2024-03-15"),
        ];

        let groups = group_by_day(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].date, "2024-03-15");
        assert_eq!(groups[0].records.len(), 2);
    }

    #[quickcheck]
    fn prop_group_by_day_flatten_recovers_input(day_indices: Vec<u8>) -> bool {
        // どのような入力でも、グループを平坦化すると元の多重集合に戻る
        let records: Vec<SpendingRecord> = day_indices
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let date = format!("2024-03-{:02}", (d % 28) + 1);
                record(&format!("id-{i}"), "100", "Food", "テスト", &date)
            })
            .collect();

        let groups = group_by_day(&records);
        let mut flattened: Vec<String> = groups
            .iter()
            .flat_map(|g| g.records.iter().map(|r| r.id.clone()))
            .collect();
        let mut expected: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

        flattened.sort();
        expected.sort();
        flattened == expected
    }

    #[test]
    fn test_sort_day_groups_ascending_and_descending() {
        let records = vec![
            record("1", "10", "Food", "A", "2024-03-02"),
            record("2", "20", "Food", "B", "2024-02-28"),
            record("3", "30", "Food", "C", "2024-03-01"),
        ];

        let groups = group_by_day(&records);

        let ascending = sort_day_groups(groups.clone(), SortOrder::Ascending);
        let dates: Vec<&str> = ascending.iter().map(|g| g.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-02-28", "2024-03-01", "2024-03-02"]);

        let descending = sort_day_groups(groups, SortOrder::Descending);
        let dates: Vec<&str> = descending.iter().map(|g| g.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-03-02", "2024-03-01", "2024-02-28"]);
    }

    #[quickcheck]
    fn prop_sort_descending_is_reverse_of_ascending(day_indices: Vec<u8>) -> bool {
        let records: Vec<SpendingRecord> = day_indices
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let date = format!("2024-{:02}-{:02}", (d % 12) + 1, (d % 28) + 1);
                record(&format!("id-{i}"), "100", "Food", "テスト", &date)
            })
            .collect();

        let groups = group_by_day(&records);
        let ascending = sort_day_groups(groups.clone(), SortOrder::Ascending);
        let mut descending = sort_day_groups(groups, SortOrder::Descending);

        descending.reverse();
        ascending == descending
    }

    #[test]
    fn test_sort_day_groups_keeps_intra_day_order() {
        let records = vec![
            record("1", "10", "Food", "A", "2024-03-02"),
            record("2", "20", "Food", "B", "2024-03-02"),
            record("3", "30", "Food", "C", "2024-03-01"),
        ];

        // 並び替えてもグループ内の順序は入力順のまま
        let sorted = sort_day_groups(group_by_day(&records), SortOrder::Descending);
        let ids: Vec<&str> = sorted[0].records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(sorted[0].date, "2024-03-02");
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_current_month_total() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let records = vec![
            record("1", "25.99", "Food", "Lunch", "2024-03-15"),
            record("2", "100", "Bills", "Electricity", "2024-02-28"),
            record("3", "4.01", "Food", "Coffee", "2024-03-01"),
        ];

        // 基準日と同じ年月の支出だけが合計される
        let total = current_month_total(&records, today);
        assert!((total - 30.0).abs() < 1e-9);

        // 別の月を基準にすると該当する支出だけが合計される
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!((current_month_total(&records, feb) - 100.0).abs() < 1e-9);

        // 支出のない月の合計は0
        let april = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert_eq!(current_month_total(&records, april), 0.0);
    }

    #[quickcheck]
    fn prop_current_month_total_is_order_invariant(amounts: Vec<u32>) -> bool {
        // 合計は入力順序に依存しない
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let records = records_from_amounts(&amounts, "2024-03-15");
        let mut reversed = records.clone();
        reversed.reverse();

        current_month_total(&records, today) == current_month_total(&reversed, today)
    }

    #[test]
    fn test_current_month_total_excludes_unparsable_amounts() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let records = vec![
            record("1", "25.99", "Food", "Lunch", "2024-03-15"),
            record("2", "不明", "Food", "壊れたデータ", "2024-03-16"),
        ];

        // 解析できない金額はNaNにせず集計から除外する
        let total = current_month_total(&records, today);
        assert!((total - 25.99).abs() < 1e-9);
        assert!(!total.is_nan());
    }

    #[test]
    fn test_current_month_category_totals() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let records = vec![
            record("1", "100", "Food", "Lunch", "2024-03-15"),
            record("2", "50", "Food", "Coffee", "2024-03-16"),
            record("3", "200", "Transport", "Train", "2024-03-16"),
            record("4", "999", "Food", "先月の食費", "2024-02-15"),
        ];

        let totals = current_month_category_totals(&records, today);
        assert_eq!(totals.len(), 2);
        assert!((totals["Food"] - 150.0).abs() < 1e-9);
        assert!((totals["Transport"] - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_series_is_chronological_and_skips_empty_months() {
        let records = vec![
            record("1", "100", "Food", "A", "2024-03-15"),
            record("2", "50", "Food", "B", "2023-12-01"),
            record("3", "200", "Food", "C", "2024-03-01"),
            record("4", "25", "Food", "D", "2024-01-10"),
        ];

        let series = monthly_series(&records);

        // 支出のある月だけが年月の昇順で並ぶ（2024-02は現れない）
        let months: Vec<&str> = series.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2023-12", "2024-01", "2024-03"]);
        assert!((series[2].total - 300.0).abs() < 1e-9);
    }

    #[quickcheck]
    fn prop_monthly_series_months_are_unique_and_increasing(day_indices: Vec<u8>) -> bool {
        let records: Vec<SpendingRecord> = day_indices
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let date = format!("202{}-{:02}-15", d % 5, (d % 12) + 1);
                record(&format!("id-{i}"), "100", "Food", "テスト", &date)
            })
            .collect();

        // 月キーは一意で、厳密に昇順
        let series = monthly_series(&records);
        series.windows(2).all(|w| w[0].month < w[1].month)
    }

    #[test]
    fn test_aggregations_do_not_mutate_input() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let records = vec![
            record("1", "100", "Food", "Lunch", "2024-03-15"),
            record("2", "200", "Bills", "Electricity", "2024-02-28"),
        ];
        let before = records.clone();

        // 派生ビューは入力を変更しない純粋関数であり、同じ入力からは同じ結果が得られる
        let total_first = current_month_total(&records, today);
        let total_second = current_month_total(&records, today);
        let series_first = monthly_series(&records);
        let series_second = monthly_series(&records);

        assert_eq!(records, before);
        assert_eq!(total_first, total_second);
        assert_eq!(series_first, series_second);
    }
}

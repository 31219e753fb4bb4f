use epg_model::Cached;

#[test]
fn recomputes_only_when_the_tag_changes() {
    let mut cache: Cached<Vec<u64>> = Cached::new();
    let mut fills = 0;
    for tag in [3, 3, 4, 4, 3] {
        let value = cache.get_or_update(tag, |value| {
            fills += 1;
            value.clear();
            value.push(tag * 10);
        });
        assert_eq!(value, &vec![tag * 10]);
    }
    assert_eq!(fills, 3);
}

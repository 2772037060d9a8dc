use plcsql::codegen::GeneratedUnit;

/// Assert some generated line equals `expected` up to indentation
pub fn assert_has_line(java: &GeneratedUnit, expected: &str) {
    assert!(
        java.lines.iter().any(|l| l.trim() == expected),
        "Expected line {:?} in:\n{}",
        expected,
        java.source()
    );
}

/// Assert some generated line contains `fragment`
pub fn assert_mentions(java: &GeneratedUnit, fragment: &str) {
    assert!(
        java.lines.iter().any(|l| l.contains(fragment)),
        "Expected {:?} in:\n{}",
        fragment,
        java.source()
    );
}

/// One node's range of generated lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkedRange {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

/// Parse a marker string, asserting that every range is closed in
/// reverse order of opening and lies inside its parent.
pub fn assert_well_bracketed(markers: &str, line_count: usize) -> Vec<MarkedRange> {
    let mut open: Vec<(usize, u32, u32)> = Vec::new();
    let mut ranges = Vec::new();
    for token in markers.split_whitespace() {
        if let Some(rest) = token.strip_prefix('(') {
            let parts: Vec<usize> = rest
                .split(',')
                .map(|n| n.parse().expect("numeric marker"))
                .collect();
            assert_eq!(parts.len(), 3, "bad opening marker {:?}", token);
            if let Some(&(parent_start, _, _)) = open.last() {
                assert!(parts[0] >= parent_start, "child opens before parent: {}", markers);
            }
            open.push((parts[0], parts[1] as u32, parts[2] as u32));
        } else if let Some(rest) = token.strip_prefix(')') {
            let end: usize = rest.parse().expect("numeric marker");
            let (start, line, column) = open.pop().expect("closing marker without opening");
            assert!(end >= start, "range ends before it starts: {}", markers);
            assert!(end <= line_count + 1, "range beyond the class: {}", markers);
            ranges.push(MarkedRange {
                start,
                end,
                line,
                column,
            });
        } else {
            panic!("unexpected marker token {:?}", token);
        }
    }
    assert!(open.is_empty(), "unclosed ranges in {}", markers);
    ranges
}

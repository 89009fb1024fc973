/// Compact display of a topic weight: `950`, `1.2k`, `3.4M`.
pub fn human_weight(w: f64) -> String {
    let mut n = w;
    let units = ["", "k", "M", "G"]; let mut u = 0;
    while n.abs() >= 1000.0 && u < units.len() - 1 { n /= 1000.0; u += 1; }
    if u == 0 && n.fract() == 0.0 { format!("{}", n as i64) }
    else if u == 0 { format!("{:.1}", n) }
    else { format!("{:.1}{}", n, units[u]) }
}

#[cfg(test)]
mod tests {
    use super::human_weight;

    #[test]
    fn compact_units() {
        assert_eq!(human_weight(950.0), "950");
        assert_eq!(human_weight(2.5), "2.5");
        assert_eq!(human_weight(1234.0), "1.2k");
        assert_eq!(human_weight(3_400_000.0), "3.4M");
    }
}

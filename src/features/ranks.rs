//! Reference-year ranks.

use std::collections::HashMap;

use crate::domain::{FeatureRecord, Indicator};

/// Rank values descending; ties share the lowest rank and consume its slots.
///
/// `None` inputs stay unranked.
pub fn min_rank_descending(values: &[Option<f64>]) -> Vec<Option<u32>> {
    let mut order: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|x| !x.is_nan()).map(|x| (i, x)))
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut ranks = vec![None; values.len()];
    let mut current = 0u32;
    let mut prev: Option<f64> = None;
    for (pos, (idx, value)) in order.into_iter().enumerate() {
        if prev != Some(value) {
            current = pos as u32 + 1;
            prev = Some(value);
        }
        ranks[idx] = Some(current);
    }
    ranks
}

/// Rank GDP per capita and population within `year`, then attach each
/// country's ranks to every one of its rows.
///
/// Rows are joined on (country, iso_code); countries absent from `year` get no rank.
pub fn compute_ranks(rows: &mut [FeatureRecord], year: i32) {
    let in_year: Vec<&FeatureRecord> = rows.iter().filter(|r| r.year() == year).collect();
    let column = |ind: Indicator| in_year.iter().map(|r| r.value(ind)).collect::<Vec<_>>();
    let gdp = min_rank_descending(&column(Indicator::GdpPerCapita));
    let pop = min_rank_descending(&column(Indicator::Population));

    let lookup: HashMap<(String, Option<String>), (Option<u32>, Option<u32>)> = in_year
        .iter()
        .zip(gdp.into_iter().zip(pop))
        .map(|(r, ranks)| ((r.base.country.clone(), r.base.iso_code.clone()), ranks))
        .collect();

    for row in rows.iter_mut() {
        let key = (row.base.country.clone(), row.base.iso_code.clone());
        let (gdp_rank, pop_rank) = lookup.get(&key).copied().unwrap_or((None, None));
        row.gdp_pc_rank = gdp_rank;
        row.population_rank = pop_rank;
    }
}

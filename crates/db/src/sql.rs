//! `QueryBuilder` construction for tour reads.
//!
//! Column names come from [`TourField::column`]; every literal is bound.

use natours_core::query::{CompareOp, FilterValue, TourFilter, TourQuery};
use sqlx::{Postgres, QueryBuilder};

/// Column list shared across tour queries.
pub const TOUR_COLUMNS: &str = "id, name, slug, duration, max_group_size, difficulty, \
                                ratings_average, ratings_quantity, price, price_discount, \
                                summary, description, image_cover, images, created_at, \
                                start_dates, secret_tour, guides";

/// An ordered listing for `query`, paged unless `query.paged` is false.
pub fn select_tours(query: &TourQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {TOUR_COLUMNS} FROM tours"));
    push_where(&mut qb, &query.filter);

    qb.push(" ORDER BY ");
    for key in &query.sort {
        qb.push(key.field.column());
        // Matches the in-memory order: absent values sort lowest.
        qb.push(if key.descending {
            " DESC NULLS LAST, "
        } else {
            " ASC NULLS FIRST, "
        });
    }
    qb.push("id ASC");
    if query.paged {
        qb.push(" LIMIT ");
        qb.push_bind(query.clamped_limit());
        qb.push(" OFFSET ");
        qb.push_bind(query.clamped_offset());
    }
    qb
}

/// Every tour matching `filter`, by ascending id.
pub fn select_matching(filter: &TourFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {TOUR_COLUMNS} FROM tours"));
    push_where(&mut qb, filter);
    qb.push(" ORDER BY id ASC");
    qb
}

/// The first tour matching `filter`.
pub fn select_one(filter: &TourFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = select_matching(filter);
    qb.push(" LIMIT 1");
    qb
}

fn push_where(qb: &mut QueryBuilder<'static, Postgres>, filter: &TourFilter) {
    for (i, condition) in filter.conditions().iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(condition.field.column());
        qb.push(operator(condition.op));
        match condition.value.clone() {
            FilterValue::Bool(v) => qb.push_bind(v),
            FilterValue::Integer(v) => qb.push_bind(v),
            FilterValue::Number(v) => qb.push_bind(v),
            FilterValue::Text(v) => qb.push_bind(v),
            FilterValue::Timestamp(v) => qb.push_bind(v),
        };
    }
}

fn operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => " = ",
        // NULL columns count as "not equal", as in the in-memory store.
        CompareOp::Ne => " IS DISTINCT FROM ",
        CompareOp::Gt => " > ",
        CompareOp::Gte => " >= ",
        CompareOp::Lt => " < ",
        CompareOp::Lte => " <= ",
    }
}

#[cfg(test)]
mod tests {
    use natours_core::query::{SortKey, TourField, Visibility};

    use super::*;

    #[test]
    fn default_listing_is_visible_ordered_and_paged() {
        let query = TourQuery::with_filter(TourFilter::new().visible(Visibility::PublicOnly));
        let qb = select_tours(&query);
        assert_eq!(
            qb.sql(),
            format!(
                "SELECT {TOUR_COLUMNS} FROM tours WHERE secret_tour IS DISTINCT FROM $1 \
                 ORDER BY created_at DESC NULLS LAST, id ASC LIMIT $2 OFFSET $3"
            )
        );
    }

    #[test]
    fn conditions_are_joined_with_and() {
        let filter = TourFilter::new()
            .and(TourField::Price, CompareOp::Lt, FilterValue::Number(1000.0))
            .and(
                TourField::Difficulty,
                CompareOp::Eq,
                FilterValue::Text("easy".into()),
            );
        let qb = select_matching(&filter);
        assert_eq!(
            qb.sql(),
            format!(
                "SELECT {TOUR_COLUMNS} FROM tours WHERE price < $1 AND difficulty = $2 \
                 ORDER BY id ASC"
            )
        );
    }

    #[test]
    fn custom_sort_keys_come_before_id() {
        let query = TourQuery {
            sort: vec![
                SortKey {
                    field: TourField::Price,
                    descending: false,
                },
                SortKey {
                    field: TourField::RatingsAverage,
                    descending: true,
                },
            ],
            ..TourQuery::default()
        };
        let qb = select_tours(&query);
        assert!(qb.sql().ends_with(
            "ORDER BY price ASC NULLS FIRST, ratings_average DESC NULLS LAST, id ASC \
             LIMIT $1 OFFSET $2"
        ));
    }

    #[test]
    fn unpaged_listing_has_no_limit() {
        let qb = select_tours(&TourQuery::all(TourFilter::new()));
        assert!(qb.sql().ends_with("ORDER BY created_at DESC NULLS LAST, id ASC"));
    }

    #[test]
    fn select_one_limits_to_a_single_row() {
        let qb = select_one(&TourFilter::by_slug("the-forest-hiker"));
        assert!(qb.sql().ends_with("WHERE slug = $1 ORDER BY id ASC LIMIT 1"));
    }
}

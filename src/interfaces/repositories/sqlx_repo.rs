use sqlx::{
    query_builder::Separated, Encode, PgPool, Postgres, QueryBuilder, Type,
};

use crate::{
    entities::option_fields::OptionField,
    query::{SortField, SortKey},
};

#[derive(Clone)]
pub struct SqlxProjectRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxBlogPostRepo {
    pub pool: PgPool,
}

/// Emits `column = $n` when the value was supplied.
pub(crate) fn push_set<'args, T>(
    set: &mut Separated<'_, 'args, Postgres, &'static str>,
    column: &str,
    value: Option<T>,
) where
    T: 'args + Encode<'args, Postgres> + Type<Postgres>,
{
    if let Some(value) = value {
        set.push(format!("{column} = ")).push_bind_unseparated(value);
    }
}

/// Emits `column = $n` or `column = NULL` for a nullable column.
pub(crate) fn push_set_nullable<'args>(
    set: &mut Separated<'_, 'args, Postgres, &'static str>,
    column: &str,
    field: OptionField<String>,
) {
    match field {
        OptionField::Unchanged => {}
        OptionField::SetToNull => {
            set.push(format!("{column} = NULL"));
        }
        OptionField::SetToValue(value) => {
            set.push(format!("{column} = ")).push_bind_unseparated(value);
        }
    }
}

pub(crate) fn push_order_by<R, F: SortField<R>>(
    builder: &mut QueryBuilder<'_, Postgres>,
    keys: &[SortKey<F>],
) {
    if keys.is_empty() {
        return;
    }
    builder.push(" ORDER BY ");
    let mut order = builder.separated(", ");
    for key in keys {
        order.push(format!("{} {}", key.field.column(), key.direction.as_sql()));
    }
}

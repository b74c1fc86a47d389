use crate::engine::arguments::OutputPolicy;
use crate::engine::runtime::BuiltInRegistry;
use crate::model::Library;

mod boolean;
mod collections;
mod common;
mod comparison;
mod datetime;
mod introspection;
mod math;
mod strings;
mod swrlm;
mod swrlx;
mod temporal;

/// Registry holding every built-in of every library.
pub fn default_registry() -> BuiltInRegistry {
    let mut reg = BuiltInRegistry::new();
    register_default_built_ins(&mut reg);
    reg
}

fn register_default_built_ins(reg: &mut BuiltInRegistry) {
    macro_rules! reg {
        ($lib:ident, $local:expr, $arity:expr, $policy:ident, $func:expr $(,)?) => {
            reg.register(Library::$lib, $local, $arity, Some($arity), OutputPolicy::$policy, $func)
        };
    }
    macro_rules! reg_range {
        ($lib:ident, $local:expr, $min:expr, $max:expr, $policy:ident, $func:expr $(,)?) => {
            reg.register(Library::$lib, $local, $min, Some($max), OutputPolicy::$policy, $func)
        };
    }
    macro_rules! reg_variadic {
        ($lib:ident, $local:expr, $min:expr, $policy:ident, $func:expr $(,)?) => {
            reg.register(Library::$lib, $local, $min, None, OutputPolicy::$policy, $func)
        };
    }

    // ===== swrlb: comparison =====
    reg!(Swrlb, "equal", 2, None, comparison::equal_fn);
    reg!(Swrlb, "notEqual", 2, None, comparison::not_equal_fn);
    reg!(Swrlb, "lessThan", 2, None, comparison::less_than_fn);
    reg!(Swrlb, "lessThanOrEqual", 2, None, comparison::less_than_or_equal_fn);
    reg!(Swrlb, "greaterThan", 2, None, comparison::greater_than_fn);
    reg!(Swrlb, "greaterThanOrEqual", 2, None, comparison::greater_than_or_equal_fn);

    // ===== swrlb: math =====
    reg_variadic!(Swrlb, "add", 2, First, math::add_fn);
    reg_variadic!(Swrlb, "multiply", 2, First, math::multiply_fn);
    reg!(Swrlb, "subtract", 3, First, math::subtract_fn);
    reg!(Swrlb, "divide", 3, First, math::divide_fn);
    reg!(Swrlb, "integerDivide", 3, First, math::integer_divide_fn);
    reg!(Swrlb, "mod", 3, First, math::mod_fn);
    reg!(Swrlb, "pow", 3, First, math::pow_fn);
    reg!(Swrlb, "unaryPlus", 2, First, math::unary_plus_fn);
    reg!(Swrlb, "unaryMinus", 2, First, math::unary_minus_fn);
    reg!(Swrlb, "abs", 2, First, math::abs_fn);
    reg!(Swrlb, "ceiling", 2, First, math::ceiling_fn);
    reg!(Swrlb, "floor", 2, First, math::floor_fn);
    reg!(Swrlb, "round", 2, First, math::round_fn);
    reg!(Swrlb, "roundHalfToEven", 2, First, math::round_half_to_even_fn);
    reg!(Swrlb, "sin", 2, First, math::sin_fn);
    reg!(Swrlb, "cos", 2, First, math::cos_fn);
    reg!(Swrlb, "tan", 2, First, math::tan_fn);

    // ===== swrlb: boolean =====
    reg!(Swrlb, "booleanNot", 2, First, boolean::boolean_not_fn);

    // ===== swrlb: strings =====
    reg!(Swrlb, "stringEqualIgnoreCase", 2, None, strings::string_equal_ignore_case_fn);
    reg_variadic!(Swrlb, "stringConcat", 1, First, strings::string_concat_fn);
    reg_range!(Swrlb, "substring", 3, 4, First, strings::substring_fn);
    reg!(Swrlb, "stringLength", 2, First, strings::string_length_fn);
    reg!(Swrlb, "normalizeSpace", 2, First, strings::normalize_space_fn);
    reg!(Swrlb, "upperCase", 2, First, strings::upper_case_fn);
    reg!(Swrlb, "lowerCase", 2, First, strings::lower_case_fn);
    reg!(Swrlb, "translate", 4, First, strings::translate_fn);
    reg!(Swrlb, "contains", 2, None, strings::contains_fn);
    reg!(Swrlb, "containsIgnoreCase", 2, None, strings::contains_ignore_case_fn);
    reg!(Swrlb, "startsWith", 2, None, strings::starts_with_fn);
    reg!(Swrlb, "endsWith", 2, None, strings::ends_with_fn);
    reg!(Swrlb, "substringBefore", 3, First, strings::substring_before_fn);
    reg!(Swrlb, "substringAfter", 3, First, strings::substring_after_fn);
    reg_range!(Swrlb, "matches", 2, 3, None, strings::matches_fn);
    reg_range!(Swrlb, "replace", 4, 5, First, strings::replace_fn);
    reg_range!(Swrlb, "tokenize", 3, 4, First, strings::tokenize_fn);

    // ===== swrlb: dates, times and durations =====
    reg!(Swrlb, "yearMonthDuration", 3, Any, datetime::year_month_duration_fn);
    reg!(Swrlb, "dayTimeDuration", 5, Any, datetime::day_time_duration_fn);
    reg!(Swrlb, "date", 4, Any, datetime::date_fn);
    reg!(Swrlb, "time", 4, Any, datetime::time_fn);
    reg!(Swrlb, "dateTime", 7, Any, datetime::date_time_fn);
    reg_variadic!(Swrlb, "addYearMonthDurations", 2, First, datetime::add_year_month_durations_fn);
    reg!(Swrlb, "subtractYearMonthDurations", 3, First, datetime::subtract_year_month_durations_fn);
    reg_variadic!(Swrlb, "addDayTimeDurations", 2, First, datetime::add_day_time_durations_fn);
    reg!(Swrlb, "subtractDayTimeDurations", 3, First, datetime::subtract_day_time_durations_fn);
    reg!(Swrlb, "multiplyDayTimeDuration", 3, First, datetime::multiply_day_time_duration_fn);
    reg!(Swrlb, "divideDayTimeDuration", 3, First, datetime::divide_day_time_duration_fn);
    reg!(Swrlb, "subtractDates", 3, First, datetime::subtract_dates_fn);
    reg!(Swrlb, "subtractTimes", 3, First, datetime::subtract_times_fn);
    reg!(
        Swrlb,
        "subtractDateTimesYieldingDayTimeDuration",
        3,
        First,
        datetime::subtract_date_times_fn,
    );
    reg!(Swrlb, "addYearMonthDurationToDate", 3, First, datetime::add_year_month_duration_to_date_fn);
    reg!(Swrlb, "addDayTimeDurationToDate", 3, First, datetime::add_day_time_duration_to_date_fn);
    reg!(
        Swrlb,
        "subtractYearMonthDurationFromDate",
        3,
        First,
        datetime::subtract_year_month_duration_from_date_fn,
    );
    reg!(
        Swrlb,
        "subtractDayTimeDurationFromDate",
        3,
        First,
        datetime::subtract_day_time_duration_from_date_fn,
    );
    reg!(
        Swrlb,
        "addYearMonthDurationToDateTime",
        3,
        First,
        datetime::add_year_month_duration_to_date_time_fn,
    );
    reg!(
        Swrlb,
        "addDayTimeDurationToDateTime",
        3,
        First,
        datetime::add_day_time_duration_to_date_time_fn,
    );
    reg!(
        Swrlb,
        "subtractYearMonthDurationFromDateTime",
        3,
        First,
        datetime::subtract_year_month_duration_from_date_time_fn,
    );
    reg!(
        Swrlb,
        "subtractDayTimeDurationFromDateTime",
        3,
        First,
        datetime::subtract_day_time_duration_from_date_time_fn,
    );
    reg!(Swrlb, "addDayTimeDurationToTime", 3, First, datetime::add_day_time_duration_to_time_fn);
    reg!(
        Swrlb,
        "subtractDayTimeDurationFromTime",
        3,
        First,
        datetime::subtract_day_time_duration_from_time_fn,
    );

    // ===== temporal =====
    reg!(Temporal, "add", 4, First, temporal::add_fn);
    reg!(Temporal, "duration", 4, First, temporal::duration_fn);
    for relation in temporal::ALLEN_RELATIONS {
        reg_range!(Temporal, relation, 2, 5, None, temporal::allen_fn);
    }

    // ===== swrlm =====
    reg!(Swrlm, "sqrt", 2, First, swrlm::sqrt_fn);
    reg!(Swrlm, "log", 2, First, swrlm::log_fn);
    reg!(Swrlm, "exp", 2, First, swrlm::exp_fn);
    reg_variadic!(Swrlm, "eval", 2, First, swrlm::eval_fn);

    // ===== swrlx =====
    reg_variadic!(Swrlx, "makeOWLThing", 1, First, swrlx::make_owl_thing_fn);

    // ===== sqwrl: collection construction =====
    reg!(Sqwrl, "makeBag", 2, Any, collections::make_bag_fn);
    reg!(Sqwrl, "makeSet", 2, Any, collections::make_set_fn);
    // One argument is accepted here so the call reports its own contract error.
    reg_variadic!(Sqwrl, "groupBy", 1, Any, collections::group_by_fn);

    // ===== sqwrl: collection consumption =====
    reg!(Sqwrl, "size", 2, First, collections::size_fn);
    reg!(Sqwrl, "isEmpty", 1, None, collections::is_empty_fn);
    reg!(Sqwrl, "notEmpty", 1, None, collections::not_empty_fn);
    reg!(Sqwrl, "element", 2, First, collections::element_fn);
    reg!(Sqwrl, "notElement", 2, None, collections::not_element_fn);
    reg!(Sqwrl, "contains", 2, None, collections::contains_fn);
    reg!(Sqwrl, "notContains", 2, None, collections::not_contains_fn);
    reg!(Sqwrl, "min", 2, First, collections::min_fn);
    reg!(Sqwrl, "max", 2, First, collections::max_fn);
    reg!(Sqwrl, "sum", 2, First, collections::sum_fn);
    reg!(Sqwrl, "avg", 2, First, collections::avg_fn);
    reg!(Sqwrl, "median", 2, First, collections::median_fn);
    reg!(Sqwrl, "first", 2, First, collections::first_fn);
    reg!(Sqwrl, "last", 2, First, collections::last_fn);
    reg!(Sqwrl, "nth", 3, First, collections::nth_fn);
    reg!(Sqwrl, "nthLast", 3, First, collections::nth_last_fn);
    reg!(Sqwrl, "equal", 2, None, collections::equal_fn);
    reg!(Sqwrl, "notEqual", 2, None, collections::not_equal_fn);
    reg!(Sqwrl, "intersects", 2, None, collections::intersects_fn);
    reg!(Sqwrl, "notIntersects", 2, None, collections::not_intersects_fn);
    reg!(Sqwrl, "intersection", 3, First, collections::intersection_fn);
    reg!(Sqwrl, "union", 3, First, collections::union_fn);
    reg!(Sqwrl, "difference", 3, First, collections::difference_fn);

    // ===== abox / tbox / rbox =====
    reg!(Abox, "caa", 2, Any, introspection::caa_fn);
    reg!(Abox, "opaa", 3, Any, introspection::opaa_fn);
    reg!(Abox, "dpaa", 3, Any, introspection::dpaa_fn);
    reg!(Abox, "sia", 2, Any, introspection::sia_fn);
    reg!(Abox, "dia", 2, Any, introspection::dia_fn);
    reg!(Tbox, "cd", 1, Any, introspection::cd_fn);
    reg!(Tbox, "opd", 1, Any, introspection::opd_fn);
    reg!(Tbox, "dpd", 1, Any, introspection::dpd_fn);
    reg!(Tbox, "sca", 2, Any, introspection::sca_fn);
    reg!(Tbox, "eca", 2, Any, introspection::eca_fn);
    reg!(Tbox, "dca", 2, Any, introspection::dca_fn);
    reg!(Rbox, "sopa", 2, Any, introspection::sopa_fn);
    reg!(Rbox, "sdpa", 2, Any, introspection::sdpa_fn);
    reg!(Rbox, "fopa", 1, Any, introspection::fopa_fn);
    reg!(Rbox, "topa", 1, Any, introspection::topa_fn);
    reg!(Rbox, "spa", 1, Any, introspection::spa_fn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::runtime::{ErrorCode, ResolveError};
    use crate::model::BuiltInName;
    use rstest::rstest;

    #[rstest]
    fn catalog_is_complete() {
        let reg = default_registry();
        for name in ["swrlb:add", "swrlb:tokenize", "temporal:overlaps", "sqwrl:groupBy", "abox:caa", "rbox:spa"] {
            let name = BuiltInName::parse(name).unwrap();
            assert!(reg.contains(&name), "{name} missing");
        }
    }

    #[rstest]
    fn arity_errors_name_the_built_in() {
        let reg = default_registry();
        let name = BuiltInName::new(Library::Swrlb, "subtract");
        let err: crate::engine::runtime::Error = reg.resolve(&name, 2).unwrap_err().into();
        assert_eq!(err.code, ErrorCode::WrongArity);
        assert!(err.message.contains("swrlb:subtract"));
        let unknown = BuiltInName::new(Library::Swrlb, "frobnicate");
        assert!(matches!(reg.resolve(&unknown, 1), Err(ResolveError::Unknown(_))));
    }
}

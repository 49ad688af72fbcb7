// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Run-time dispatch from a target index of unknown shape to one concrete
pipeline instantiation.

The dimensionality and record variant are resolved from the target's
declarations, the raw event representation from the source. Everything that
can be rejected is rejected here, before any event is touched.
*/

use tracing::info;

use crate::box_controller::BoxSettings;
use crate::events::{EventVariant, LeanEvent, MdEvent, RegularEvent};
use crate::index::{IndexTarget, MdEventIndex};
use crate::pipeline::{build_index, BuildSettings, BuildSummary};
use crate::progress::{BuildProgress, LogProgress};
use crate::source::{
    CoordinateTransform, EventSource, RawEventKind, TofEvent, UnitConversion, WeightedEvent,
    WeightedEventNoTime,
};
use crate::spatial::{AxisExtent, SpaceBounds, MAX_DIMS, MIN_DIMS};
use crate::types::{Coord, IndexError, IndexResult};

/// Index `source` into `target`, replacing its box tree.
pub fn append_events<U, T>(
    target: &mut dyn IndexTarget,
    source: &EventSource,
    conversion: &U,
    transform: &T,
    settings: &BuildSettings,
) -> IndexResult<BuildSummary>
where
    U: UnitConversion,
    T: CoordinateTransform,
{
    append_events_with_progress(target, source, conversion, transform, settings, &LogProgress)
}

/// [`append_events`] reporting pipeline milestones to `progress`.
pub fn append_events_with_progress<U, T>(
    target: &mut dyn IndexTarget,
    source: &EventSource,
    conversion: &U,
    transform: &T,
    settings: &BuildSettings,
    progress: &dyn BuildProgress,
) -> IndexResult<BuildSummary>
where
    U: UnitConversion,
    T: CoordinateTransform,
{
    let ndims = target.num_dims();
    if !(MIN_DIMS..=MAX_DIMS).contains(&ndims) {
        return Err(IndexError::configuration(format!(
            "{} dimensions (supported: {}..={})",
            ndims, MIN_DIMS, MAX_DIMS
        )));
    }
    if transform.num_dims() != ndims {
        return Err(IndexError::configuration(format!(
            "coordinate transform produces {} coordinates for a {}-dimensional index",
            transform.num_dims(),
            ndims
        )));
    }
    let kind = resolve_event_kind(source)?;

    info!(
        target: "mdindex-engine",
        "[DISPATCH] {}-D {} index from {} {} events in {} channels",
        ndims,
        target.event_variant(),
        source.total_events(),
        kind,
        source.num_channels()
    );

    let mut run = move || match ndims {
        2 => dispatch_variant::<U, T, 2>(target, kind, source, conversion, transform, settings, progress),
        3 => dispatch_variant::<U, T, 3>(target, kind, source, conversion, transform, settings, progress),
        4 => dispatch_variant::<U, T, 4>(target, kind, source, conversion, transform, settings, progress),
        5 => dispatch_variant::<U, T, 5>(target, kind, source, conversion, transform, settings, progress),
        6 => dispatch_variant::<U, T, 6>(target, kind, source, conversion, transform, settings, progress),
        7 => dispatch_variant::<U, T, 7>(target, kind, source, conversion, transform, settings, progress),
        8 => dispatch_variant::<U, T, 8>(target, kind, source, conversion, transform, settings, progress),
        n => Err(IndexError::configuration(format!("{} dimensions", n))),
    };

    if settings.num_threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.num_threads)
            .thread_name(|i| format!("mdindex-worker-{}", i))
            .build()
            .map_err(|e| IndexError::ThreadPool(e.to_string()))?;
        pool.install(run)
    } else {
        run()
    }
}

/// Shared raw representation of all channels; an empty source defaults to
/// time-of-flight events.
fn resolve_event_kind(source: &EventSource) -> IndexResult<RawEventKind> {
    match source.event_kind() {
        Ok(kind) => Ok(kind.unwrap_or(RawEventKind::Tof)),
        Err((first, other)) => Err(IndexError::configuration(format!(
            "channels mix {} and {} events",
            first, other
        ))),
    }
}

fn dispatch_variant<U, T, const N: usize>(
    target: &mut dyn IndexTarget,
    kind: RawEventKind,
    source: &EventSource,
    conversion: &U,
    transform: &T,
    settings: &BuildSettings,
    progress: &dyn BuildProgress,
) -> IndexResult<BuildSummary>
where
    U: UnitConversion,
    T: CoordinateTransform,
{
    match target.event_variant() {
        EventVariant::Lean => dispatch_kind::<LeanEvent<N>, U, T, N>(
            target, kind, source, conversion, transform, settings, progress,
        ),
        EventVariant::Regular => dispatch_kind::<RegularEvent<N>, U, T, N>(
            target, kind, source, conversion, transform, settings, progress,
        ),
    }
}

fn dispatch_kind<E, U, T, const N: usize>(
    target: &mut dyn IndexTarget,
    kind: RawEventKind,
    source: &EventSource,
    conversion: &U,
    transform: &T,
    settings: &BuildSettings,
    progress: &dyn BuildProgress,
) -> IndexResult<BuildSummary>
where
    E: MdEvent<N>,
    U: UnitConversion,
    T: CoordinateTransform,
{
    let index = target
        .as_any_mut()
        .downcast_mut::<MdEventIndex<E, N>>()
        .ok_or_else(|| {
            IndexError::configuration(format!(
                "index storage does not hold {}-D {} events as declared",
                N,
                E::VARIANT
            ))
        })?;

    match kind {
        RawEventKind::Tof => build_index::<TofEvent, E, U, T, N>(
            source, conversion, transform, index, settings, progress,
        ),
        RawEventKind::Weighted => build_index::<WeightedEvent, E, U, T, N>(
            source, conversion, transform, index, settings, progress,
        ),
        RawEventKind::WeightedNoTime => build_index::<WeightedEventNoTime, E, U, T, N>(
            source, conversion, transform, index, settings, progress,
        ),
    }
}

/// Create an empty index for a dimensionality and variant chosen at run time.
///
/// `min` and `max` give the bounds of each axis and must both hold
/// `num_dims` values.
pub fn create_index(
    num_dims: usize,
    variant: EventVariant,
    min: &[Coord],
    max: &[Coord],
    settings: BoxSettings,
) -> IndexResult<Box<dyn IndexTarget>> {
    if !(MIN_DIMS..=MAX_DIMS).contains(&num_dims) {
        return Err(IndexError::configuration(format!(
            "{} dimensions (supported: {}..={})",
            num_dims, MIN_DIMS, MAX_DIMS
        )));
    }
    if min.len() != num_dims || max.len() != num_dims {
        return Err(IndexError::configuration(format!(
            "{} minima and {} maxima for {} dimensions",
            min.len(),
            max.len(),
            num_dims
        )));
    }

    match num_dims {
        2 => create_variant::<2>(variant, min, max, settings),
        3 => create_variant::<3>(variant, min, max, settings),
        4 => create_variant::<4>(variant, min, max, settings),
        5 => create_variant::<5>(variant, min, max, settings),
        6 => create_variant::<6>(variant, min, max, settings),
        7 => create_variant::<7>(variant, min, max, settings),
        8 => create_variant::<8>(variant, min, max, settings),
        n => Err(IndexError::configuration(format!("{} dimensions", n))),
    }
}

fn create_variant<const N: usize>(
    variant: EventVariant,
    min: &[Coord],
    max: &[Coord],
    settings: BoxSettings,
) -> IndexResult<Box<dyn IndexTarget>> {
    let mut axes = [AxisExtent::new(0.0, 0.0); N];
    for (axis, extent) in axes.iter_mut().enumerate() {
        *extent = AxisExtent::new(min[axis], max[axis]);
    }
    let bounds = SpaceBounds::new(axes)?;

    let target: Box<dyn IndexTarget> = match variant {
        EventVariant::Lean => Box::new(MdEventIndex::<LeanEvent<N>, N>::new(bounds, settings)?),
        EventVariant::Regular => {
            Box::new(MdEventIndex::<RegularEvent<N>, N>::new(bounds, settings)?)
        }
    };
    Ok(target)
}

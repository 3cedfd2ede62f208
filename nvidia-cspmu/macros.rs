//! Declarative macros for the static attribute tables

/// Build a `&'static [EventAttr]` from `"name" => config` entries
///
/// An entry prefixed with `socket4` expands into four per-socket events
/// `socket_0_<suffix>` .. `socket_3_<suffix>` with consecutive config values.
///
/// # Example
/// ```
/// use nvcspmu::event_attrs;
/// use nvcspmu::attrs::EventAttr;
///
/// static EVENTS: &[EventAttr] = event_attrs![
///     "bus_cycles" => 0x1d,
///     socket4 "rd_data" => 0x101,
/// ];
///
/// assert_eq!(EVENTS.len(), 5);
/// assert_eq!(EVENTS[2].name, "socket_1_rd_data");
/// assert_eq!(EVENTS[2].config, 0x102);
/// ```
#[macro_export]
macro_rules! event_attrs {
    (@acc [$($out:expr,)*]) => {
        &[$($out,)*]
    };
    (@acc [$($out:expr,)*] socket4 $suffix:literal => $config:expr, $($rest:tt)*) => {
        $crate::event_attrs!(@acc [
            $($out,)*
            $crate::attrs::EventAttr::new(concat!("socket_0_", $suffix), $config),
            $crate::attrs::EventAttr::new(concat!("socket_1_", $suffix), $config + 1),
            $crate::attrs::EventAttr::new(concat!("socket_2_", $suffix), $config + 2),
            $crate::attrs::EventAttr::new(concat!("socket_3_", $suffix), $config + 3),
        ] $($rest)*)
    };
    (@acc [$($out:expr,)*] $name:literal => $config:expr, $($rest:tt)*) => {
        $crate::event_attrs!(@acc [
            $($out,)*
            $crate::attrs::EventAttr::new($name, $config),
        ] $($rest)*)
    };
    (@acc [$($out:expr,)*] $($last:tt)+) => {
        $crate::event_attrs!(@acc [$($out,)*] $($last)+,)
    };
    ($($body:tt)*) => {
        $crate::event_attrs!(@acc [] $($body)*)
    };
}

/// Build a `&'static [FormatAttr]` from `"name" => "layout"` entries
///
/// # Example
/// ```
/// use nvcspmu::format_attrs;
/// use nvcspmu::attrs::FormatAttr;
///
/// static FORMATS: &[FormatAttr] = format_attrs![
///     "event" => "config:0-32",
///     "port" => "config1:0-1",
/// ];
///
/// assert_eq!(FORMATS[1].layout, "config1:0-1");
/// ```
#[macro_export]
macro_rules! format_attrs {
    ($($name:literal => $layout:literal),* $(,)?) => {
        &[$($crate::attrs::FormatAttr::new($name, $layout),)*]
    };
}

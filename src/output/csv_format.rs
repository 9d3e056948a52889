//! CSV output formatting.

use super::RenderOptions;
use crate::scanner::{PortResult, ScanReport};
use std::io::{self, Write};

/// Write one CSV row per port.
pub fn write_csv<W: Write>(report: &ScanReport, options: RenderOptions, out: &mut W) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["port", "state", "service", "banner", "response_time_ms"])?;

    let rows: Vec<&PortResult> = if options.show_closed {
        report.ordered().collect()
    } else {
        report.open_ports().collect()
    };

    for result in rows {
        let port = result.port().to_string();
        let state = result.state().to_string();
        let response_time = result
            .response_time_ms()
            .map_or(String::new(), |t| t.to_string());

        wtr.write_record([
            port.as_str(),
            state.as_str(),
            result.service().unwrap_or(""),
            result.banner().map(|b| b.text()).unwrap_or(""),
            response_time.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::Banner;
    use crate::scanner::ResultAggregator;
    use crate::types::Port;

    #[test]
    fn test_csv_rows() {
        let mut agg = ResultAggregator::new("10.0.0.5");
        agg.record(PortResult::closed(Port::new(9999)));
        agg.record(
            PortResult::open(Port::new(21), "ftp")
                .with_banner(Some(Banner::new("220 (vsFTPd 3.0.3), ready", false))),
        );
        let report = agg.finish(&[]);

        let mut buf = Vec::new();
        write_csv(
            &report,
            RenderOptions {
                show_closed: true,
                banners: true,
            },
            &mut buf,
        )
        .unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "port,state,service,banner,response_time_ms");
        assert_eq!(lines[1], "21,open,ftp,\"220 (vsFTPd 3.0.3), ready\",");
        assert_eq!(lines[2], "9999,closed,,,");
    }
}

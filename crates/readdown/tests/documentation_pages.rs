//! Conversions of API documentation markup that trips up naive converters.

use readdown::MarkdownService;

fn render(html: &str) -> String {
    MarkdownService::new().render_html(html)
}

#[test]
fn mark_renders_as_inline_code() {
    let result = render("<p>The API endpoint <mark>/v1/forecast</mark> accepts coordinates.</p>");
    assert_eq!(result, "The API endpoint `/v1/forecast` accepts coordinates.");
}

#[test]
fn heading_wrapped_in_anchor_stays_a_heading() {
    let html = r##"
        <div>
          <a href="#api_documentation">
            <h2 id="api_documentation">API Documentation</h2>
          </a>
        </div>
    "##;
    let result = render(html);
    assert_eq!(result, "## API Documentation");
    assert!(!result.contains("[##"));
    assert!(!result.contains("](#api"));
}

#[test]
fn line_breaks_in_table_cells_use_marker() {
    let html = r##"
        <table>
          <tr>
            <th>Variable</th>
            <th>Description</th>
          </tr>
          <tr>
            <td>wind_speed_10m<br />wind_speed_80m<br />wind_speed_120m</td>
            <td>Wind speed at different heights</td>
          </tr>
        </table>
    "##;
    let result = render(html);
    let lines: Vec<&str> = result.lines().collect();
    assert_eq!(lines.len(), 3, "table must stay on three lines: {result}");
    assert!(lines[2].contains("wind_speed_10m<br>wind_speed_80m<br>wind_speed_120m"));
    assert!(lines.iter().all(|line| line.starts_with('|') && line.ends_with('|')));
}

#[test]
fn underscores_in_table_cells_are_not_escaped() {
    let html = r##"
        <table>
          <tr><th>Variable</th></tr>
          <tr><td>temperature_2m</td></tr>
          <tr><td>apparent_temperature</td></tr>
        </table>
    "##;
    let result = render(html);
    assert!(result.contains("temperature_2m"));
    assert!(result.contains("apparent_temperature"));
    assert!(!result.contains("temperature\\_2m"));
    assert!(!result.contains("apparent\\_temperature"));
}

#[test]
fn complete_weather_api_section() {
    let html = r##"
        <div class="mt-6 md:mt-12">
          <a href="#api_documentation">
            <h2 id="api_documentation">API Documentation</h2>
          </a>
          <div class="mt-2 md:mt-4">
            <p>
              The API endpoint <mark>/v1/forecast</mark> accepts a geographical coordinate, a list of
              weather variables and responds with a JSON hourly weather forecast for 7 days. If
              <mark>&forecast_days=16</mark> is set, up to 16 days of forecast can be returned.
            </p>
            <table>
              <thead>
                <tr>
                  <th>Parameter</th>
                  <th>Format</th>
                  <th>Required</th>
                  <th>Description</th>
                </tr>
              </thead>
              <tbody>
                <tr>
                  <th>latitude, longitude</th>
                  <td>Floating point</td>
                  <td>Yes</td>
                  <td>Geographical WGS84 coordinates. E.g. <mark>&latitude=52.52</mark></td>
                </tr>
                <tr>
                  <th>temperature_unit</th>
                  <td>String</td>
                  <td>No</td>
                  <td>If <mark>fahrenheit</mark> is set, all temperature values are converted.</td>
                </tr>
              </tbody>
            </table>
          </div>
        </div>
    "##;

    let result = render(html);

    assert!(result.starts_with("## API Documentation\n\nThe API endpoint `/v1/forecast` accepts"));
    assert!(!result.contains("[##"));
    assert!(result.contains("`&forecast_days=16`"));
    assert!(result.contains("E.g. `&latitude=52.52`"));
    assert!(result.contains("`fahrenheit`"));
    assert!(result.contains("| temperature_unit"));
    assert!(!result.contains("temperature\\_unit"));

    let table: Vec<&str> = result.lines().filter(|line| line.starts_with('|')).collect();
    assert_eq!(table.len(), 4);
    assert!(table[0].starts_with("| Parameter"));
    assert!(table[1].starts_with("| ---"));
}

#[test]
fn emphasis_inside_table_cells() {
    let html = r##"
        <table>
          <tr>
            <td><strong>Bold text</strong> with <em>italic</em></td>
          </tr>
        </table>
    "##;
    let result = render(html);
    assert!(result.contains("| **Bold text** with *italic* |"));
}

#[test]
fn inline_code_inside_table_cells() {
    let html = r##"
        <table>
          <tr>
            <td><code>code example</code></td>
          </tr>
        </table>
    "##;
    assert!(render(html).contains("`code example`"));
}

#[test]
fn header_cells_with_scope_attributes() {
    let html = r##"
        <table>
          <thead>
            <tr>
              <th scope="col">Parameter</th>
              <th scope="col">Format</th>
            </tr>
          </thead>
          <tbody>
            <tr>
              <th scope="row">latitude</th>
              <td>Floating point</td>
            </tr>
          </tbody>
        </table>
    "##;
    assert_eq!(
        render(html),
        "| Parameter | Format         |\n| --------- | -------------- |\n| latitude  | Floating point |"
    );
}

#[test]
fn paragraphs_inside_cells_join_with_marker() {
    let html = "<table><tr><th>Notes</th></tr><tr><td><p>one</p><p>two</p></td></tr></table>";
    let result = render(html);
    assert!(result.contains("| one<br>two |"), "{result}");
}

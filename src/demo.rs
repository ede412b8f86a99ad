use chrono::NaiveDate;

use crate::dates::format_date;
use crate::types::ApodRecord;

pub const DEMO_TITLE: &str = "A Double Helix Lunar Eclipse";
pub const DEMO_MEDIA_URL: &str = "/assets/demo-lunar-eclipse.jpg";
pub const DEMO_EXPLANATION: &str = "The image was timed to capture a total lunar eclipse, but it came with quite a twist. \
First, the eclipse: the fully Earth-shadowed Moon is visible as the orange orb near the top. \
The eclipsed Moon's orange color is caused by a slight amount of red light scattered first by Earth's atmosphere, adding a color like a setting Sun. \
Now, the twist: one of the apparent double helix bands is the Milky Way, the central disk of our home galaxy. \
The second band is zodiacal light, sunlight scattered by dust in our Solar System. \
The reason they cross is because the plane where dust orbits our Sun is tilted relative to the plane where stars orbit our Galaxy. \
This well-known tilt is shown dramatically in the featured wide-angle Mercator-projected picture, spanning from horizon to horizon, \
captured in early September from Mingantu Observing Station in Inner Mongolia, China.";

/// Canned entry shown whenever the upstream yields nothing usable.
pub fn demo_record(today: NaiveDate) -> ApodRecord {
    ApodRecord {
        title: DEMO_TITLE.to_string(),
        date: format_date(today),
        media_url: DEMO_MEDIA_URL.to_string(),
        explanation: DEMO_EXPLANATION.to_string(),
    }
}

pub fn is_demo(record: &ApodRecord) -> bool {
    record.title == DEMO_TITLE && record.media_url == DEMO_MEDIA_URL
}

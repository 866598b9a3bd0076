mod live_api;
mod test_util;

/// Output seam for the `print` native. The binaries write to stdout; tests
/// capture lines instead so evaluation stays deterministic.
pub trait IoHandler {
    fn write_line(&mut self, line: &str);
}

pub struct StdoutIoHandler;

impl IoHandler for StdoutIoHandler {
    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

#[derive(Debug, Default)]
pub struct CaptureIoHandler {
    pub lines: Vec<String>,
}

impl IoHandler for CaptureIoHandler {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
